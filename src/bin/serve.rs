//! Prediction service entry point.
//!
//! Loads the model artifact once at startup and serves the prediction API.
//! If the artifact cannot be loaded the service still starts, reports
//! `model_loaded: false` on `/health`, and answers every prediction with an
//! explicit model-unavailable error.
//!
//! Usage:
//!   cargo run --bin serve --release -- [options]
//!
//! Options:
//!   --model PATH   Artifact path (default: house_price_model.pfor)
//!   --addr ADDR    Bind address (default: 127.0.0.1:8000)

use std::net::SocketAddr;
use std::path::PathBuf;

use priceforest::serve;

#[derive(Debug)]
struct Args {
    model: PathBuf,
    addr: SocketAddr,
}

fn parse_args() -> Args {
    let mut model = PathBuf::from("house_price_model.pfor");
    let mut addr: SocketAddr = "127.0.0.1:8000".parse().expect("default address");

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--model" => model = PathBuf::from(it.next().expect("--model path")),
            "--addr" => {
                addr = it
                    .next()
                    .expect("--addr value")
                    .parse()
                    .expect("--addr host:port")
            }
            "--help" => {
                eprintln!(
                    "serve\n\n  --model <path>   Artifact path (default: house_price_model.pfor)\n  --addr <addr>    Bind address (default: 127.0.0.1:8000)"
                );
                std::process::exit(0);
            }
            other => panic!("unknown arg: {other}"),
        }
    }

    Args { model, addr }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = parse_args();

    let state = serve::load_state(&args.model);
    if !state.model_loaded() {
        log::warn!("starting degraded: predictions will return 503 until a valid artifact is provided");
    }

    let app = serve::router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .expect("bind listen address");
    println!("price service listening on http://{}", args.addr);
    axum::serve(listener, app).await.expect("serve");
}
