//! Session commands. Each returns the text printed on stdout.

use std::path::Path;

use sw_domain::process::{ProcessDefinition, ProcessFile};
use sw_sessions::Runtime;

use super::Context;

/// `start`: create a session and return its id.
pub fn start(
    ctx: &Context,
    process: Option<&str>,
    required: Vec<String>,
    process_file: Option<&Path>,
) -> anyhow::Result<String> {
    let definition = match process_file {
        Some(path) => {
            let fallback = process.unwrap_or("process");
            let mut def = ProcessFile::load(path)?.to_definition(fallback);
            if let Some(name) = process {
                def.name = name.to_string();
            }
            def
        }
        None => ProcessDefinition::new(process.unwrap_or_default(), required),
    };
    let session = ctx.runtime()?.start(&definition, &ctx.paths.workspace)?;
    Ok(session.id)
}

/// `resume`: re-check artifacts and return the resulting state.
pub fn resume(ctx: &Context, session_id: &str) -> anyhow::Result<String> {
    transition(ctx, session_id, |rt, s| {
        rt.resume_after_input(s, &ctx.paths.workspace)
    })
}

pub fn reset(ctx: &Context, session_id: &str, step_id: &str) -> anyhow::Result<String> {
    transition(ctx, session_id, |rt, s| rt.reset_step(s, step_id))
}

pub fn decide(ctx: &Context, session_id: &str, decision: &str) -> anyhow::Result<String> {
    transition(ctx, session_id, |rt, s| rt.mark_decision(s, decision))
}

pub fn step(ctx: &Context, session_id: &str, step_id: &str) -> anyhow::Result<String> {
    transition(ctx, session_id, |rt, s| rt.record_step(s, step_id))
}

pub fn checkpoint(ctx: &Context, session_id: &str) -> anyhow::Result<String> {
    transition(ctx, session_id, |rt, s| rt.await_decision(s))
}

/// `status`: the session snapshot as pretty JSON.
pub fn status(ctx: &Context, session_id: &str) -> anyhow::Result<String> {
    let status = ctx.runtime()?.status(session_id)?;
    Ok(serde_json::to_string_pretty(&status)?)
}

pub fn pause(ctx: &Context, session_id: &str) -> anyhow::Result<String> {
    let runtime = ctx.runtime()?;
    let session = runtime.load(session_id)?;
    let path = runtime.pause(session)?;
    Ok(format!("session paused | handoff: {}", path.display()))
}

pub fn complete(ctx: &Context, session_id: &str) -> anyhow::Result<String> {
    let runtime = ctx.runtime()?;
    let session = runtime.load(session_id)?;
    let path = runtime.complete(session)?;
    Ok(format!("session completed | handoff: {}", path.display()))
}

fn transition<F>(ctx: &Context, session_id: &str, op: F) -> anyhow::Result<String>
where
    F: FnOnce(&Runtime, sw_domain::Session) -> sw_domain::Result<sw_domain::Session>,
{
    let runtime = ctx.runtime()?;
    let session = runtime.load(session_id)?;
    let session = op(&runtime, session)?;
    Ok(session.state.to_string())
}
