//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use planmeter_app::{ReplayScript, replay};

    env_logger::init();
    log::info!("Starting Planmeter");

    let script = match std::env::args().nth(1) {
        Some(path) => ReplayScript::load(&path),
        None => {
            log::info!("No script given, replaying the demo line");
            Ok(ReplayScript::demo())
        }
    };

    let output = script
        .and_then(|script| replay(&script))
        .and_then(|layer| layer.to_json().map_err(Into::into));

    match output {
        Ok(json) => {
            println!("{}", json);
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Replay failed: {}", err);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
