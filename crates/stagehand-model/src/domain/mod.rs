mod kv;
pub use kv::KeyValue;

mod stage_env;
pub use stage_env::StageEnv;

mod stage;
pub use stage::{FailurePolicy, Stage, StageCategory};

mod pipeline;
pub use pipeline::PipelineDef;

mod run_id;
pub use run_id::RunId;

mod build_status;
pub use build_status::{BuildStatus, FailureKind, StageStatus};

mod build_result;
pub use build_result::{BuildResult, StageOutcome};

mod routes;
pub use routes::{DEFAULT_DEVELOPER_NAME, DEFAULT_VERSION, NAME_PATH, RouteTable, VERSION_PATH};

mod time_serde;
