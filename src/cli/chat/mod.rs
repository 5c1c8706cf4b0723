//! Chat command - interactive sessions on the terminal

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::domain::rag::{SessionHandle, StepResult};
use crate::infrastructure::services::RagSessionServiceTrait;

const EXIT_WORDS: &[&str] = &["exit", "quit"];

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state_with_config(&config).await?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    chat_loop(state.session_service.as_ref(), stdin, &mut stdout).await
}

async fn discard(service: &dyn RagSessionServiceTrait, session_id: SessionHandle) {
    if let Err(e) = service.discard(session_id).await {
        warn!(session_id = %session_id, error = %e, "Failed to discard session");
    }
}

async fn prompt<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

/// Read questions until end of input or an exit word
///
/// While a session is suspended every line is a reply to its clarification
/// request; blank replies are refused and asked for again.
pub async fn chat_loop<R, W>(
    service: &dyn RagSessionServiceTrait,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    prompt(out, "Ask a question ('exit' or 'quit' to leave).\n").await?;

    loop {
        prompt(out, "\nQuestion> ").await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        let step = match service.start(question).await {
            Ok(step) => step,
            Err(e) => {
                prompt(out, &format!("Error: {}\n", e)).await?;
                continue;
            }
        };

        let mut result = step.result;
        while let StepResult::Suspended { prompt: clarification } = &result {
            prompt(out, &format!("\n{}\n", clarification)).await?;

            let reply = loop {
                prompt(out, "Feedback> ").await?;

                match lines.next_line().await? {
                    None => {
                        discard(service, step.session_id).await;
                        return Ok(());
                    }
                    Some(reply) if reply.trim().is_empty() => {
                        prompt(out, "Please type a reply.\n").await?;
                    }
                    Some(reply) => break reply,
                }
            };

            result = match service.resume(step.session_id, &reply).await {
                Ok(result) => result,
                Err(e) => StepResult::Error {
                    message: e.to_string(),
                },
            };
        }

        match &result {
            StepResult::Complete { answer } => prompt(out, &format!("\n{}\n", answer)).await?,
            StepResult::Error { message } => prompt(out, &format!("\nError: {}\n", message)).await?,
            StepResult::Suspended { .. } => {}
        }

        discard(service, step.session_id).await;
    }

    Ok(())
}
