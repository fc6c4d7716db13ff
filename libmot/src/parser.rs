//! Recursive-descent parser.
//!
//! Grammar, with one token of lookahead:
//!
//! ```text
//! File                := PropertyList EndOfInput
//! PropertyList        := Property+
//! Property            := PropertyDeclaration ( PropertyValue EndOfLine | EndOfLine PropertyBlock? )
//! PropertyDeclaration := Word ( Word | QuotedText )?
//! PropertyValue       := Colon ( LineText | QuotedText ) | GreaterThan BlockText
//! PropertyBlock       := Indent PropertyList Outdent
//! ```
//!
//! Parsing stops at the first mismatch; no partial tree is returned.

use tracing::{debug, debug_span};

use crate::content::FileContent;
use crate::error::{ParseError, Result};
use crate::lexer::Lexer;
use crate::nodes::{
    FileNode, PropertyBlockNode, PropertyDeclarationNode, PropertyListNode, PropertyNode,
    PropertyValueNode,
};
use crate::token::{Token, TokenType};

/// Parses a whole file into its syntax tree.
pub fn parse_file(content: &FileContent) -> Result<FileNode<'_>> {
    let _span = debug_span!("parse_file", file = %content.filename()).entered();

    let result = Parser::new(content).parse_file();
    match &result {
        Ok(_) => debug!(lines = content.line_count(), "parsed"),
        Err(err) => debug!(location = %err.location(), "parse failed"),
    }
    result
}

struct Parser<'c> {
    lexer: Lexer<'c>,
}

impl<'c> Parser<'c> {
    fn new(content: &'c FileContent) -> Self {
        Self {
            lexer: Lexer::new(content),
        }
    }

    fn parse_file(&mut self) -> Result<FileNode<'c>> {
        let property_list = self.parse_property_list()?;
        let end_of_input = self.require(TokenType::EndOfInput)?;
        Ok(FileNode::new(property_list, end_of_input))
    }

    fn parse_property_list(&mut self) -> Result<PropertyListNode<'c>> {
        let mut properties = vec![self.parse_property()?];
        while self.lexer.peek_type() == TokenType::Word {
            properties.push(self.parse_property()?);
        }
        Ok(PropertyListNode::new(properties))
    }

    fn parse_property(&mut self) -> Result<PropertyNode<'c>> {
        let declaration = self.parse_property_declaration()?;

        if self.lexer.peek_type() == TokenType::EndOfLine {
            let end_of_line = self.lexer.advance();
            let block = if self.lexer.peek_type() == TokenType::Indent {
                Some(self.parse_property_block()?)
            } else {
                None
            };
            return Ok(PropertyNode::new(declaration, None, end_of_line, block));
        }

        let value = self.parse_property_value()?;
        let end_of_line = self.require(TokenType::EndOfLine)?;
        Ok(PropertyNode::new(declaration, Some(value), end_of_line, None))
    }

    fn parse_property_declaration(&mut self) -> Result<PropertyDeclarationNode<'c>> {
        let property_type = self.require(TokenType::Word)?;
        let property_name = match self.lexer.peek_type() {
            TokenType::Word | TokenType::QuotedText => Some(self.lexer.advance()),
            _ => None,
        };
        Ok(PropertyDeclarationNode::new(property_type, property_name))
    }

    fn parse_property_value(&mut self) -> Result<PropertyValueNode<'c>> {
        let specifier = self.require_one_of(&[TokenType::Colon, TokenType::GreaterThan])?;
        let text = if specifier.token_type() == TokenType::Colon {
            self.require_one_of(&[TokenType::LineText, TokenType::QuotedText])?
        } else {
            self.require(TokenType::BlockText)?
        };
        Ok(PropertyValueNode::new(specifier, text))
    }

    fn parse_property_block(&mut self) -> Result<PropertyBlockNode<'c>> {
        let indent = self.require(TokenType::Indent)?;
        let property_list = self.parse_property_list()?;
        let outdent = self.require(TokenType::Outdent)?;
        Ok(PropertyBlockNode::new(indent, property_list, outdent))
    }

    fn require(&mut self, token_type: TokenType) -> Result<Token<'c>> {
        self.require_one_of(&[token_type])
    }

    fn require_one_of(&mut self, expected: &[TokenType]) -> Result<Token<'c>> {
        let token = self.lexer.peek();
        if expected.contains(&token.token_type()) {
            return Ok(self.lexer.advance());
        }
        Err(ParseError::at_token(token, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;

    fn parse(text: &str) -> std::result::Result<String, ParseError> {
        let content = FileContent::new("test.mot", text.as_bytes().to_vec());
        // bound so the tree is dropped before `content`
        let dump = parse_file(&content).map(|file| file.dump());
        dump
    }

    fn parse_err(text: &str) -> ParseError {
        parse(text).unwrap_err()
    }

    #[test]
    fn test_declaration_with_quoted_name() {
        let content = FileContent::new("test.mot", b"repo \"My Repo\"\n".to_vec());
        let file = parse_file(&content).unwrap();
        let properties = file.property_list().properties();
        assert_eq!(properties.len(), 1);

        let declaration = properties[0].declaration();
        assert_eq!(declaration.type_value().unwrap().as_bytes(), b"repo");
        assert_eq!(declaration.name_value().unwrap().as_bytes(), b"My Repo");
        assert!(properties[0].value().is_none());
        assert!(properties[0].block().is_none());
    }

    #[test]
    fn test_profile() {
        let text = "\
PROFILE myprofile
PREFIX tools
    env dev: \"/opt/dev/tools\"
    env prod: /opt/prod/tools
    override: merge
REPO main
INCLUDE \"other.mot\"
ALIAS x: \"y\"
notes>
    This is block text.
    Second line, same indentation required.
";
        let content = FileContent::new("profile.mot", text.as_bytes().to_vec());
        let file = parse_file(&content).unwrap();
        let properties = file.property_list().properties();
        assert_eq!(properties.len(), 6);

        let prefix = properties[1].block().unwrap().property_list().properties();
        assert_eq!(prefix.len(), 3);
        assert_eq!(prefix[0].declaration().name_value().unwrap().as_bytes(), b"dev");
        assert_eq!(prefix[1].value().unwrap().value().unwrap().as_bytes(), b"/opt/prod/tools");
        assert!(prefix[2].declaration().property_name().is_none());

        let notes = properties[5].value().unwrap();
        assert_eq!(
            notes.value().unwrap().as_bytes(),
            b"This is block text.\nSecond line, same indentation required."
        );
    }

    #[test]
    fn test_empty_file_fails() {
        assert_eq!(
            parse_err(""),
            ParseError::UnexpectedToken {
                found: TokenType::EndOfLine,
                expected: vec![TokenType::Word],
                location: crate::content::Location {
                    filename: "test.mot".to_string(),
                    line: 1,
                    column: 1,
                },
            }
        );
        assert!(parse("# only a comment\n\n").is_err());
    }

    #[test]
    fn test_bad_value_after_declaration() {
        let err = parse_err("REPO main extra\n");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { found: TokenType::Word, ref expected, .. }
                if expected == &[TokenType::Colon, TokenType::GreaterThan]
        ));
    }

    #[test]
    fn test_missing_text_after_colon() {
        let err = parse_err("ALIAS x:\n");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { found: TokenType::EndOfLine, ref expected, .. }
                if expected == &[TokenType::LineText, TokenType::QuotedText]
        ));
    }

    #[test]
    fn test_text_after_greater_than() {
        let err = parse_err("notes> inline\n");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { found: TokenType::Word, ref expected, .. }
                if expected == &[TokenType::BlockText]
        ));
    }

    #[test]
    fn test_value_and_block_are_exclusive() {
        let err = parse_err("ALIAS x: y\n    REPO main\n");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { found: TokenType::Indent, ref expected, .. }
                if expected == &[TokenType::EndOfInput]
        ));
    }

    #[test]
    fn test_lexical_error_surfaces_kind() {
        let err = parse_err("PREFIX tools\n\tenv dev: x\n");
        match err {
            ParseError::Lex { kind, location } => {
                assert_eq!(kind, LexErrorKind::TabIndentation);
                assert_eq!((location.line, location.column), (2, 1));
            }
            other => panic!("expected a lexical error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_format() {
        let err = parse_err("REPO main\n: x\n");
        assert_eq!(
            err.to_string(),
            "Error: Cannot parse configuration file\n    Unexpected token Colon\n    at \"test.mot\" line 2:1\n    Expected: EndOfInput"
        );
    }

    #[test]
    fn test_nested_blocks() {
        let dump = parse("A\n    B\n        C: d\n    E\n").unwrap();
        assert_eq!(
            dump,
            "\
File
  PropertyList
    Property
      PropertyDeclaration
        Word \"A\"
      EndOfLine
      PropertyBlock
        Indent
        PropertyList
          Property
            PropertyDeclaration
              Word \"B\"
            EndOfLine
            PropertyBlock
              Indent
              PropertyList
                Property
                  PropertyDeclaration
                    Word \"C\"
                  PropertyValue
                    Colon
                    LineText \"d\"
                  EndOfLine
              Outdent
          Property
            PropertyDeclaration
              Word \"E\"
            EndOfLine
        Outdent
  EndOfInput
"
        );
    }
}
