use std::{io, path::Path, process::ExitStatus, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};

use crate::AnalysisError;

#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
}

pub(crate) async fn collect_stream<R>(mut reader: R) -> Result<Vec<u8>, io::Error>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    Ok(buffer)
}

pub(crate) fn spawn_with_retry(
    command: &mut Command,
    binary: &Path,
) -> Result<tokio::process::Child, AnalysisError> {
    let mut backoff = Duration::from_millis(2);
    for attempt in 0..5 {
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(source) => {
                // ETXTBSY: the artifact was written moments ago and is still open.
                let is_busy = source.raw_os_error() == Some(26);
                if is_busy && attempt < 4 {
                    std::thread::sleep(backoff);
                    backoff = std::cmp::min(backoff * 2, Duration::from_millis(50));
                    continue;
                }
                return Err(AnalysisError::Spawn {
                    binary: binary.to_path_buf(),
                    source,
                });
            }
        }
    }

    unreachable!("spawn_with_retry should return before exhausting retries")
}

/// Runs `command` to completion, capturing both output streams.
pub(crate) async fn run_command(
    mut command: Command,
    binary: &Path,
) -> Result<CommandOutput, AnalysisError> {
    command.stdin(std::process::Stdio::null());
    command.stdout(std::process::Stdio::piped());
    command.stderr(std::process::Stdio::piped());

    let mut child = spawn_with_retry(&mut command, binary)?;

    let stdout = child.stdout.take().ok_or(AnalysisError::MissingStdout)?;
    let stderr = child.stderr.take().ok_or(AnalysisError::MissingStderr)?;

    let stdout_task = tokio::spawn(collect_stream(stdout));
    let stderr_task = tokio::spawn(collect_stream(stderr));

    let status = child.wait().await.map_err(AnalysisError::Wait)?;

    let stdout = stdout_task
        .await
        .map_err(|e| AnalysisError::Join(e.to_string()))?
        .map_err(AnalysisError::StdoutRead)?;
    let stderr = stderr_task
        .await
        .map_err(|e| AnalysisError::Join(e.to_string()))?
        .map_err(AnalysisError::StderrRead)?;

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Splits captured output into lines, replacing invalid UTF-8.
pub(crate) fn output_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
