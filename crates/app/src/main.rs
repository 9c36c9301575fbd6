use clap::Parser;

#[tokio::main]
async fn main() {
    let args = app::arguments::Arguments::parse();
    observe::tracing::initialize(&args.log_filter);
    tracing::info!("running pixel client with validated arguments:\n{}", args);
    app::main(args).await;
}
