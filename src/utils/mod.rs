pub mod error;
pub mod exec;
pub mod external_prog;
pub mod fetch;
pub mod git;
pub mod locate;
pub mod provisioner;
pub mod report;
