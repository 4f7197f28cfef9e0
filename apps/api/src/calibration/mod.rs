// Calibration & recommendation lock.
// The numeric path (classifier → experience → credibility → hard cap) produces a final score,
// the recommendation module locks it, and the narrative stages only filter and rewrite text.

pub mod consistency;
pub mod credibility;
pub mod experience;
pub mod handlers;
pub mod hard_cap;
pub mod jd_parser;
pub mod narrative;
pub mod pipeline;
pub mod recommendation;
pub mod role_classifier;
pub mod signals;
pub mod text;
pub mod ui_contract;
pub mod violations;
