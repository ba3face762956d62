pub mod correlation;
