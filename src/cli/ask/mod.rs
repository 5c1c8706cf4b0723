//! Ask command - one question, clarifications answered from the command line

use clap::Args;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::domain::rag::{SessionStep, StepResult};
use crate::infrastructure::services::RagSessionServiceTrait;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// Reply to a clarification request; repeat for later requests
    #[arg(short, long = "feedback")]
    pub feedback: Vec<String>,

    /// Print every step as a JSON line
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state_with_config(&config).await?;

    let mut stdout = tokio::io::stdout();
    let result = ask(state.session_service.as_ref(), &args, &mut stdout).await?;
    stdout.flush().await?;

    if let StepResult::Error { message } = result {
        anyhow::bail!(message);
    }

    Ok(())
}

/// Run one session, feeding `args.feedback` to each suspension in order
///
/// Returns the last step reached. When the replies run out while the session
/// is still suspended, the pending prompt is printed and the session is left
/// waiting.
pub async fn ask<W>(
    service: &dyn RagSessionServiceTrait,
    args: &AskArgs,
    out: &mut W,
) -> anyhow::Result<StepResult>
where
    W: AsyncWrite + Unpin,
{
    let step = service.start(&args.question).await?;
    let session_id = step.session_id;

    let mut replies = args.feedback.iter().filter(|reply| {
        let keep = !reply.trim().is_empty();
        if !keep {
            warn!("Skipping blank --feedback value");
        }
        keep
    });

    let mut result = step.result;
    loop {
        if args.json {
            let line = serde_json::to_string(&SessionStep {
                session_id,
                result: result.clone(),
            })?;
            out.write_all(format!("{}\n", line).as_bytes()).await?;
        }

        let StepResult::Suspended { prompt } = &result else {
            break;
        };

        let Some(reply) = replies.next() else {
            if !args.json {
                out.write_all(format!("{}\n\n", prompt).as_bytes()).await?;
                out.write_all(
                    format!("Session {} is waiting for feedback.\n", session_id).as_bytes(),
                )
                .await?;
            }
            break;
        };

        if !args.json {
            out.write_all(format!("{}\n> {}\n\n", prompt, reply).as_bytes())
                .await?;
        }

        result = service.resume(session_id, reply).await?;
    }

    if let (false, StepResult::Complete { answer }) = (args.json, &result) {
        out.write_all(format!("{}\n", answer).as_bytes()).await?;
    }

    Ok(result)
}
