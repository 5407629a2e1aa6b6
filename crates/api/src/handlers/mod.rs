pub mod aigc;
