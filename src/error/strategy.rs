use thiserror::Error;

/// Setup or teardown failure of one strategy run.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Failed to spawn worker {index}: {source}")]
    SpawnWorker {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to resolve worker executable: {source}")]
    ResolveExecutable {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build event loop: {source}")]
    EventLoop {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open collaborator session: {message}")]
    Session { message: String },
    #[error("Collaborator '{name}' cannot be rebuilt in a worker process.")]
    NotTransferable { name: &'static str },
    #[error("Worker {index} handshake failed: {message}")]
    Handshake { index: usize, message: String },
    #[error("Worker {index} failed during {context}: {source}")]
    WorkerFrame {
        index: usize,
        context: &'static str,
        #[source]
        source: FrameError,
    },
    #[error("Worker channel failed during {context}: {source}")]
    Channel {
        context: &'static str,
        #[source]
        source: FrameError,
    },
    #[error("Run produced {received} results for {expected} tasks.")]
    Incomplete { expected: usize, received: usize },
    #[error("{0}")]
    Setup(String),
}

/// Failure reading or writing one newline-delimited JSON message.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("channel closed")]
    Closed,
    #[error("message exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
}
