use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a JSON stub for the endpoint categories, or `None` when the
/// sandbox forbids binding a local socket.
///
/// # Errors
///
/// Returns an error if the listener cannot be configured.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    let listener = match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => return Ok(None),
        Err(err) => return Err(format!("bind test server failed: {}", err)),
    };
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok(Some((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    )))
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 2048];
    let read = match stream.read(&mut buffer) {
        Ok(read) => read,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let known = ["/comments/", "/todos/", "/posts/"]
        .iter()
        .any(|prefix| path.starts_with(prefix));
    let response = if known {
        let body = format!("{{\"path\":\"{}\"}}", path);
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned()
    };
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `stratbench` binary from `dir` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_stratbench<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_stratbench_with_config_env(dir, args, None)
}

/// Like [`run_stratbench`], with `STRATBENCH_CONFIG` set or cleared.
///
/// # Errors
///
/// Returns an error when the binary cannot be located or started.
pub fn run_stratbench_with_config_env<I, S>(
    dir: &Path,
    args: I,
    config: Option<&Path>,
) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = stratbench_bin()?;
    let mut command = Command::new(bin);
    command
        .args(args)
        .current_dir(dir)
        .env("STRATBENCH_LOG", "error");
    match config {
        Some(path) => command.env("STRATBENCH_CONFIG", path),
        None => command.env_remove("STRATBENCH_CONFIG"),
    };
    command
        .output()
        .map_err(|err| format!("run stratbench failed: {}", err))
}

/// Path of the built binary, which doubles as the process-pool worker.
///
/// # Errors
///
/// Returns an error when the binary path was not provided at compile time.
pub fn stratbench_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_stratbench").map_or_else(
        || Err("CARGO_BIN_EXE_stratbench missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

/// Parse stdout of a successful run as JSON.
///
/// # Errors
///
/// Returns an error when the run failed or stdout is not JSON.
pub fn json_stdout(output: &Output) -> Result<serde_json::Value, String> {
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    serde_json::from_slice(&output.stdout).map_err(|err| format!("parse stdout failed: {}", err))
}
