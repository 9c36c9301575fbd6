use {
    alloy::primitives::{Address, U256},
    chain_state::{MinerState, SlotState},
    std::collections::BTreeSet,
};

/// Number of slots in a full deployment (16x16 grid).
pub const SLOT_CAPACITY: u64 = 256;

/// Accrual rate the contract starts every deployment with, 2 pixels/second.
/// Used as a display fallback before the miner state has loaded.
const INITIAL_PPS: U256 = U256::from_limbs([2_000_000_000_000_000_000, 0, 0, 0]);

/// Indices of the slots controlled by `identity`.
///
/// Addresses compare as raw bytes, which makes the comparison
/// case-insensitive by construction. The zero address marks an unclaimed
/// slot and never matches. An absent identity owns nothing.
pub fn owned_indices(slots: &[SlotState], identity: Option<Address>) -> BTreeSet<usize> {
    let Some(identity) = identity else {
        return BTreeSet::new();
    };
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.miner != Address::ZERO && slot.miner == identity)
        .map(|(index, _)| index)
        .collect()
}

/// The slot to present: the lowest owned index when the identity owns any,
/// otherwise whatever the caller selected.
///
/// Owning multiple slots deliberately resolves to the lowest index, not the
/// most recently acquired one.
pub fn current_index(owned: &BTreeSet<usize>, selected: usize) -> usize {
    owned.first().copied().unwrap_or(selected)
}

/// Accrual rate to display for a slot.
///
/// Slots that have never been mined report a zero rate; fall back to the
/// wallet-wide rate (or the deployment's initial rate before that loads)
/// spread evenly over the grid.
pub fn effective_pps(slot: Option<&SlotState>, miner: Option<&MinerState>) -> U256 {
    if let Some(slot) = slot
        && !slot.pps.is_zero()
    {
        return slot.pps;
    }
    let base = miner
        .map(|miner| miner.pps)
        .filter(|pps| !pps.is_zero())
        .unwrap_or(INITIAL_PPS);
    base / U256::from(SLOT_CAPACITY)
}

/// Detects a purchase between two consecutive slot snapshots: the first slot
/// whose color changed to a valid `#RRGGBB` value.
///
/// Returns `None` on the very first snapshot (`previous` empty) so that the
/// initial load does not animate.
pub fn ripple_source<'a>(
    previous: &[SlotState],
    current: &'a [SlotState],
) -> Option<(usize, &'a str)> {
    if previous.is_empty() {
        return None;
    }
    current.iter().enumerate().find_map(|(index, slot)| {
        let changed = previous
            .get(index)
            .is_none_or(|prev| prev.color != slot.color);
        (changed && is_hex_color(&slot.color)).then_some((index, slot.color.as_str()))
    })
}

fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.bytes().all(|byte| byte.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use {super::*, number::EthUnit};

    fn slot(miner: Address, color: &str) -> SlotState {
        SlotState {
            miner,
            color: color.to_string(),
            ..Default::default()
        }
    }

    fn addr(byte: u8) -> Address {
        Address::with_last_byte(byte)
    }

    #[test]
    fn absent_identity_owns_nothing() {
        // Full deployment of unclaimed slots.
        let slots = vec![slot(Address::ZERO, ""); 256];
        let owned = owned_indices(&slots, None);
        assert!(owned.is_empty());
        assert_eq!(current_index(&owned, 0), 0);
    }

    #[test]
    fn zero_address_never_matches() {
        let slots = vec![slot(Address::ZERO, "")];
        assert!(owned_indices(&slots, Some(Address::ZERO)).is_empty());
    }

    #[test]
    fn finds_all_owned_slots() {
        let slots = vec![
            slot(addr(9), ""),
            slot(addr(1), ""),
            slot(Address::ZERO, ""),
            slot(addr(1), ""),
        ];
        let owned = owned_indices(&slots, Some(addr(1)));
        assert_eq!(owned, BTreeSet::from([1, 3]));
    }

    #[test]
    fn lowest_owned_index_wins_over_selection() {
        let owned = BTreeSet::from([5, 2, 7]);
        assert_eq!(current_index(&owned, 0), 2);
        assert_eq!(current_index(&owned, 6), 2);
        assert_eq!(current_index(&BTreeSet::new(), 6), 6);
    }

    #[test]
    fn effective_pps_prefers_the_slot_rate() {
        let mut claimed = slot(addr(1), "#ff0000");
        claimed.pps = 3u64.eth();
        assert_eq!(effective_pps(Some(&claimed), None), 3u64.eth());
    }

    #[test]
    fn effective_pps_falls_back_to_the_spread_wallet_rate() {
        let unclaimed = slot(Address::ZERO, "");
        let miner = MinerState {
            pps: 512u64.eth(),
            ..Default::default()
        };
        assert_eq!(effective_pps(Some(&unclaimed), Some(&miner)), 2u64.eth());
        // Before the miner state loads the deployment's initial rate is
        // spread instead.
        assert_eq!(
            effective_pps(Some(&unclaimed), None),
            2u64.eth() / U256::from(256u64)
        );
    }

    #[test]
    fn ripple_ignores_the_first_snapshot() {
        let current = vec![slot(addr(1), "#ff0000")];
        assert_eq!(ripple_source(&[], &current), None);
    }

    #[test]
    fn ripple_finds_the_first_changed_color() {
        let previous = vec![
            slot(addr(1), "#ff0000"),
            slot(addr(2), "#00ff00"),
            slot(addr(3), "#0000ff"),
        ];
        let mut current = previous.clone();
        current[1].color = "#123abc".to_string();
        current[2].color = "#456def".to_string();
        assert_eq!(ripple_source(&previous, &current), Some((1, "#123abc")));
    }

    #[test]
    fn ripple_skips_invalid_colors() {
        let previous = vec![slot(addr(1), "#ff0000"), slot(addr(2), "#00ff00")];
        let mut current = previous.clone();
        current[0].color = "not-a-color".to_string();
        assert_eq!(ripple_source(&previous, &current), None);
        current[1].color = "#ABCDEF".to_string();
        assert_eq!(ripple_source(&previous, &current), Some((1, "#ABCDEF")));
    }
}
