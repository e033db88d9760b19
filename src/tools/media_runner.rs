//! 外部媒體工具執行器
//!
//! 所有 ffmpeg / ffprobe 呼叫都以參數向量執行（不經過 shell），
//! 並限制最長執行時間；逾時會強制結束子程序。

use anyhow::{Context, Result, bail};
use log::debug;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 外部工具的執行結果
#[derive(Debug)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// 執行外部工具並等待結束，超過 `timeout` 即強制結束
pub fn run_tool(program: &str, args: &[String], timeout: Duration) -> Result<ToolOutput> {
    debug!("執行 {program} {}", args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("無法執行 {program}"))?;

    // 背景執行緒讀取輸出，避免管線寫滿造成子程序卡死
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("等待 {program} 結束失敗"))?
        {
            break status;
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            bail!("{program} 執行逾時（{} 秒），已強制結束", timeout.as_secs());
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect_reader(stdout_reader);
    let stderr = collect_reader(stderr_reader);

    Ok(ToolOutput {
        success: status.success(),
        exit_code: status.code(),
        stdout,
        stderr,
    })
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    source.map(|mut reader| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = reader.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
