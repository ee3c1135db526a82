#![crate_name = "zilrun"]
#![allow(dead_code)]

//! A tree-walking runtime for ZIL, the Zork Implementation Language.
//!
//! The pipeline runs in three stages: [`reader`] + [`loader`] + [`macros`] +
//! [`directives`] turn source files into a populated [`world`]; [`evaluator`]
//! and [`routine`] walk routine bodies against that world; [`command_lexer`],
//! [`command_parser`], [`resolver`] and [`command_processor`] turn player
//! input into the three bound globals an action routine expects.

#[macro_use]
extern crate lazy_static;

pub mod atom;
pub mod ast;
pub mod command_lexer;
pub mod command_parser;
pub mod command_processor;
pub mod config;
pub mod directives;
pub mod evaluator;
pub mod interrupts;
pub mod loader;
pub mod macros;
pub mod ops;
pub mod reader;
pub mod resolver;
pub mod routine;
pub mod save;
pub mod value;
pub mod world;
