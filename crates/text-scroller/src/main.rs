use std::io::Read;
use std::process::ExitCode;

use ocf_os::error::{Error, ErrorKind, Result};
use ocf_os::event_loop::EventLoop;
use ocf_os::server::Server;
use ocf_os::stack::DeviceStack;
use ocf_os::wake::WakeSignal;

use text_scroller::app::TextScroller;

use tokio::sync::oneshot;

use tracing::{error, info};

fn main() -> ExitCode {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt().init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let scroller = TextScroller::new();
    let wake = WakeSignal::new();

    let stack = DeviceStack::new(scroller.clone(), wake.clone());
    let client = stack.client();

    let event_loop = EventLoop::new(stack, wake).spawn()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::new(ErrorKind::Thread, format!("Unable to start the runtime: {e}")))?;

    let (shutdown, shutdown_signal) = oneshot::channel::<()>();
    let server = runtime.spawn(
        Server::new(client)
            .with_graceful_shutdown(async move {
                let _ = shutdown_signal.await;
            })
            .run(),
    );

    info!("Press any key to stop the device");

    // Any byte, or the end of the input, stops the device.
    let mut byte = [0; 1];
    if let Err(e) = std::io::stdin().read(&mut byte) {
        error!("Unable to read the console: {e}");
    }

    event_loop.stop();
    let _ = shutdown.send(());

    match runtime.block_on(server) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Server stopped: {e}"),
        Err(e) => error!("Server task failed: {e}"),
    }

    let report = event_loop.join()?;
    info!(
        "Device stopped after {} polls, last text: {:?}",
        report.polls,
        scroller.text().as_str_lossy()
    );

    Ok(())
}
