#[actix_web::main]
async fn main() -> std::io::Result<()> {
    jobly::cli::run().await
}
