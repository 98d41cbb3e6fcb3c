#[tokio::main]
async fn main() {
    if let Err(e) = sanjeevani_lib::run().await {
        eprintln!("sanjeevani: {e}");
        std::process::exit(1);
    }
}
