//! 交互会话
//!
//! 逐行读取用户输入，逐条输出回复，直到退出命令、输入结束或外部中断。

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::error::Result;
use crate::services::responder::{Reply, Responder};

const BANNER: &str = "\n🤖 Hybrid Chatbot: Hello! Ask me anything or type 'exit' to quit.\n\n";
const PROMPT: &str = "You: ";
const INTERRUPTED: &str = "Session ended by user.";

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// 用户输入了退出命令
    ExitCommand,
    /// 外部中断（Ctrl-C）
    Interrupted,
    /// 输入流结束
    EndOfInput,
}

/// 会话信息
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub turns: u64,
    pub end: SessionEnd,
}

pub struct ChatSession {
    id: Uuid,
    responder: Arc<Responder>,
    started_at: DateTime<Utc>,
    turns: u64,
}

impl ChatSession {
    pub fn new(responder: Arc<Responder>) -> Self {
        Self {
            id: Uuid::new_v4(),
            responder,
            started_at: Utc::now(),
            turns: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 运行会话直到结束
    ///
    /// `shutdown` 完成时会话以 "Session ended by user." 结束，不视为错误。
    /// 单轮的错误或 panic 只影响这一轮。
    pub async fn run<R, W, S>(&mut self, input: R, mut output: W, shutdown: S) -> Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        info!(session_id = %self.id, "Chat session started");
        output.write_all(BANNER.as_bytes()).await?;

        tokio::pin!(shutdown);
        let mut lines = input.lines();

        let end = loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let line = tokio::select! {
                _ = &mut shutdown => break SessionEnd::Interrupted,
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                break SessionEnd::EndOfInput;
            };

            let utterance = line.trim();
            if utterance.is_empty() {
                continue;
            }

            self.turns += 1;
            if self.responder.is_exit_command(utterance) {
                self.responder.metrics().record_exit();
                write_farewell(&mut output, self.responder.session_farewell()).await?;
                break SessionEnd::ExitCommand;
            }

            let span = info_span!("turn", session_id = %self.id, turn = self.turns);
            let turn = AssertUnwindSafe(self.responder.respond(utterance))
                .catch_unwind()
                .instrument(span);

            let outcome = tokio::select! {
                _ = &mut shutdown => break SessionEnd::Interrupted,
                outcome = turn => outcome,
            };

            match outcome {
                Ok(Ok(reply)) => {
                    write_reply(&mut output, &reply).await?;
                    if reply.end_session {
                        break SessionEnd::ExitCommand;
                    }
                }
                Ok(Err(e)) => {
                    error!(session_id = %self.id, turn = self.turns, error = %e, "Failed to produce reply");
                    self.responder.metrics().record_turn_error();
                    write_apology(&mut output, &e.to_string()).await?;
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(session_id = %self.id, turn = self.turns, error = %message, "Reply panicked");
                    self.responder.metrics().record_turn_error();
                    write_apology(&mut output, &message).await?;
                }
            }
        };

        if end != SessionEnd::ExitCommand {
            output
                .write_all(format!("\nChatbot: {INTERRUPTED}\n").as_bytes())
                .await?;
        }
        output.flush().await?;

        let summary = SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            turns: self.turns,
            end,
        };
        info!(
            session_id = %self.id,
            turns = summary.turns,
            end = ?summary.end,
            "Chat session ended"
        );
        Ok(summary)
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(output: &mut W, reply: &Reply) -> Result<()> {
    let text = format!("\nChatbot: {}\n[Source: {}]\n\n", reply.text, reply.source);
    output.write_all(text.as_bytes()).await?;
    Ok(())
}

async fn write_farewell<W: AsyncWrite + Unpin>(output: &mut W, farewell: &str) -> Result<()> {
    output
        .write_all(format!("\nChatbot: {farewell}\n").as_bytes())
        .await?;
    Ok(())
}

async fn write_apology<W: AsyncWrite + Unpin>(output: &mut W, message: &str) -> Result<()> {
    let text = format!("\nChatbot: Sorry, I encountered an error: {message}\n\n");
    output.write_all(text.as_bytes()).await?;
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure".to_string()
    }
}
