#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pageperfect_server::run().await
}
