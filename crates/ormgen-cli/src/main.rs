#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    ormgen_cli::init_tracing();

    if let Err(e) = ormgen_cli::run(std::env::args().collect()).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
