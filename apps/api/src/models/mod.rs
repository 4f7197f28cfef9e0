// Inputs handed to the calibration pipeline by upstream collaborators
// (resume parser, job intake, model analysis). Plain serde data, no behaviour.

pub mod analysis;
pub mod job;
pub mod resume;
