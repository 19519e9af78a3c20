//! Process exit codes, one per error condition.

use sw_domain::Error;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const NOT_FOUND: i32 = 3;
pub const INVALID_MANIFEST: i32 = 4;
pub const PERMISSION_DENIED: i32 = 5;
pub const TYPE_MISMATCH: i32 = 6;
pub const STEP_NOT_FOUND: i32 = 7;
pub const NO_PENDING_DECISION: i32 = 8;
pub const ENTRYPOINT: i32 = 9;
pub const PLUGIN_EXECUTION: i32 = 10;
pub const INCOMPLETE_BUNDLE: i32 = 11;
pub const CONFIG: i32 = 12;

/// Map an error to its exit code. Errors that are not a typed stepwise
/// error exit with [`FAILURE`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<Error>() else {
        return FAILURE;
    };
    match err.kind() {
        "not_found" => NOT_FOUND,
        "invalid_manifest" => INVALID_MANIFEST,
        "permission_denied" => PERMISSION_DENIED,
        "type_mismatch" => TYPE_MISMATCH,
        "step_not_found" => STEP_NOT_FOUND,
        "no_pending_decision" => NO_PENDING_DECISION,
        "entrypoint" => ENTRYPOINT,
        "plugin_execution" => PLUGIN_EXECUTION,
        "incomplete_bundle" => INCOMPLETE_BUNDLE,
        "config" => CONFIG,
        _ => FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_get_distinct_codes() {
        let code = |e: Error| exit_code(&anyhow::Error::from(e));
        assert_eq!(code(Error::SessionNotFound("x".into())), NOT_FOUND);
        assert_eq!(code(Error::PluginNotFound("x".into())), NOT_FOUND);
        assert_eq!(code(Error::StepNotFound("s".into())), STEP_NOT_FOUND);
        assert_eq!(
            code(Error::NoPendingDecision {
                state: "RUNNING".into()
            }),
            NO_PENDING_DECISION
        );
        assert_eq!(
            code(Error::TypeMismatch {
                plugin_id: "p".into(),
                expected: "send".into(),
                actual: "hook".into()
            }),
            TYPE_MISMATCH
        );
        assert_eq!(code(Error::PermissionDenied("net".into())), PERMISSION_DENIED);
    }

    #[test]
    fn untyped_errors_are_generic_failures() {
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), FAILURE);
    }
}
