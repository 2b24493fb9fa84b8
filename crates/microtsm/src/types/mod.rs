use std::sync::Arc;

use microtsm_common::NormalizedWorkerOptions;

pub type SharedOptions = Arc<NormalizedWorkerOptions>;
