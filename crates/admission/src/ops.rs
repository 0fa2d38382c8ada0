use std::path::Path;

use crate::config::GuardConfig;
use crate::error::CommandError;
use crate::policy::AdmissionPolicy;

/// Handle one operator command line: `reload`, `info` or `list`.
///
/// Returns the text to send back to the invoking operator. Errors carry
/// a short message and never touch in-flight game state; in particular a
/// failed `reload` leaves the previously active config untouched.
pub fn handle_command(
    policy: &mut AdmissionPolicy,
    config_path: &Path,
    line: &str,
    now: u64,
) -> Result<String, CommandError> {
    let mut parts = line.split_whitespace();
    let command = parts.next().ok_or(CommandError::Usage("reload | info | list"))?;
    if parts.next().is_some() {
        return Err(CommandError::Usage("reload | info | list"));
    }
    match command {
        "reload" => {
            let config = GuardConfig::load(config_path).map_err(CommandError::Reload)?;
            policy.reload(config);
            Ok("configuration reloaded.".to_string())
        }
        "info" => {
            let dump = serde_json::json!({
                "tps": policy.current_tps(),
                "counters": policy.counters(),
                "config": policy.config(),
            });
            Ok(serde_json::to_string_pretty(&dump)?)
        }
        "list" => {
            let warnings = policy.warnings().entries();
            let mut out = format!("{} recent warnings:", warnings.len());
            for w in warnings {
                out.push_str(&format!(
                    "\n- {} at {} {},{},{} | {} seconds ago.",
                    w.kind,
                    w.world,
                    w.x,
                    w.y,
                    w.z,
                    now.saturating_sub(w.time)
                ));
            }
            Ok(out)
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
