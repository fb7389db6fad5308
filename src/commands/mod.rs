pub mod setup_drake;
pub mod setup_manipulation;
pub mod verify;
