/**
 * ============================================================================
 * TYPES MODULE
 * ============================================================================
 * 
 * PURPOSE: Data shapes exchanged with the privileged nginx backend
 * 
 * SUBMODULES:
 * - nginx: Service status snapshot and per-type log records
 * - project: Config file / project / template records consumed by the
 *            config-management views
 * 
 * ============================================================================
 */

pub mod nginx;
pub mod project;

pub use nginx::{LogBook, LogRecord, LogType, ServiceInfo, ServiceStatus};
pub use project::{ConfigFile, ConfigFileStatus, ConfigFileType, ProjectConfig, ProjectTemplate};
