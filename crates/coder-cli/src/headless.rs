use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use coder_core::config::Config;
use coder_core::ClientState;
use coder_core::IngestFlow;
use coder_core::IngestStatus;
use coder_core::InputField;
use coder_core::NoticeKind;
use coder_core::UserAction;
use coder_exec::HttpBackend;
use coder_exec::Session;
use serde_json::json;
use tokio::io::AsyncReadExt;

fn session(config: Config) -> anyhow::Result<Session<HttpBackend>> {
    let backend = HttpBackend::new(&config.backend)?;
    Ok(Session::new(ClientState::new(config), Arc::new(backend)))
}

pub async fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

/// Prints every status line the flow goes through and fails unless it succeeded.
async fn run_ingest(
    mut session: Session<HttpBackend>,
    flow: IngestFlow,
    submit: UserAction,
) -> anyhow::Result<()> {
    session.user(submit);
    let status = session.state().ingestion.status(flow);
    if !status.is_in_progress() {
        bail!("{}", status.message(flow));
    }
    println!("{}", status.message(flow));
    session.settle_all().await;

    let status = session.state().ingestion.status(flow);
    println!("{}", status.message(flow));
    if *status != IngestStatus::Succeeded {
        bail!("{} ingestion did not succeed", flow.label());
    }
    Ok(())
}

pub async fn ingest_text(config: Config, text: String) -> anyhow::Result<()> {
    let mut session = session(config)?;
    session.user(UserAction::SetInput {
        field: InputField::IngestText,
        text,
    });
    run_ingest(session, IngestFlow::Text, UserAction::SubmitIngestText).await
}

pub async fn ingest_file(config: Config, path: PathBuf) -> anyhow::Result<()> {
    let mut session = session(config)?;
    session.user(UserAction::SelectFile(path));
    run_ingest(session, IngestFlow::File, UserAction::SubmitIngestFile).await
}

pub async fn ask(config: Config, query: String, as_json: bool) -> anyhow::Result<()> {
    let mut session = session(config)?;
    session.user(UserAction::SetInput {
        field: InputField::Query,
        text: query.clone(),
    });
    session.user(UserAction::SubmitQuery);
    if session.outstanding() == 0 {
        bail!("query is empty");
    }
    session.settle_all().await;

    let Some(answer) = session.state().conversation.latest_answer() else {
        bail!("no answer was recorded");
    };
    let answered = answer.is_rateable();
    if as_json {
        let turn = json!({
            "query": query,
            "answer": answer.text,
            "ok": answered,
        });
        println!("{}", serde_json::to_string_pretty(&turn)?);
    } else {
        println!("{}", answer.text);
    }

    if !answered {
        bail!("query failed");
    }
    Ok(())
}

pub async fn feedback(
    config: Config,
    query: String,
    code: String,
    upvoted: bool,
) -> anyhow::Result<()> {
    let mut session = session(config)?;
    session.user(UserAction::SubmitFeedback {
        original_query: Some(query),
        code,
        upvoted,
    });
    if session.outstanding() == 0 {
        bail!("feedback needs a non-empty query");
    }
    session.settle_all().await;

    match &session.state().interaction.notice {
        Some(notice) if notice.kind == NoticeKind::Info => {
            println!("{}", notice.message);
            Ok(())
        }
        Some(notice) => bail!("{}", notice.message),
        None => bail!("feedback was not acknowledged"),
    }
}

pub async fn ping(config: Config) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let welcome = backend.ping().await?;
    println!("{welcome}");
    Ok(())
}

pub async fn shutdown(config: Config) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    backend.shutdown().await?;
    println!("Knowledge store shut down at {}", backend.base_url());
    Ok(())
}
