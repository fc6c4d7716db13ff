//! MOT profile parser.
//!
//! MOT is an indentation-sensitive configuration language for describing
//! development profiles: which repositories, prefixes and aliases to set up.
//! Every line is a property, `type name`, optionally followed by a value
//! (`: text`, `: "quoted"`, or `>` with an indented block of text) or by an
//! indented list of nested properties.
//!
//! # Parsing Pipeline
//!
//! 1. **FileContent**: Holds the file bytes and the line index which lets any
//!    span be resolved to a line and column.
//!
//! 2. **Lexer**: Pulls tokens from the content on demand, resolving
//!    indentation into explicit indent and outdent markers and decoding
//!    quoted and block text into [`MotString`] values.
//!
//! 3. **Parser**: Recursive descent over the token stream into a
//!    [`FileNode`] tree. The first error aborts the parse.
//!
//! # Example
//!
//! ```
//! use libmot::{parse_file, FileContent};
//!
//! let content = FileContent::new("profile.mot", b"REPO main\n".to_vec());
//! let file = parse_file(&content).unwrap();
//! let repo = &file.property_list().properties()[0];
//! assert_eq!(repo.declaration().type_value().unwrap(), &libmot::constants::REPO);
//! ```

pub mod constants;
mod content;
mod error;
mod lexer;
pub mod nodes;
mod parser;
mod scanner;
mod span;
mod string;
mod token;
pub mod utf8;

pub use content::{FileContent, LoadOptions, Location, PositionDetails, DEFAULT_MAX_FILE_SIZE};
pub use error::{LexErrorKind, LoadError, ParseError, Result};
pub use lexer::{tokenize, Lexer, SPACES_PER_INDENT};
pub use nodes::FileNode;
pub use parser::parse_file;
pub use span::FileSpan;
pub use string::MotString;
pub use token::{Token, TokenType};

