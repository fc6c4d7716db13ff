//! Syntax tree.
//!
//! Each node owns its children outright; tokens are the leaves. [`Node`] is a
//! borrowed view over any of the six node kinds, used for generic traversal.

use std::fmt::{self, Write};

use crate::span::FileSpan;
use crate::string::MotString;
use crate::token::{Token, TokenType};

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    PropertyList,
    Property,
    PropertyDeclaration,
    PropertyValue,
    PropertyBlock,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::PropertyList => "PropertyList",
            NodeKind::Property => "Property",
            NodeKind::PropertyDeclaration => "PropertyDeclaration",
            NodeKind::PropertyValue => "PropertyValue",
            NodeKind::PropertyBlock => "PropertyBlock",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root of a parsed file.
#[derive(Debug, Clone)]
pub struct FileNode<'c> {
    property_list: PropertyListNode<'c>,
    end_of_input: Token<'c>,
}

/// One or more properties at the same indentation level.
#[derive(Debug, Clone)]
pub struct PropertyListNode<'c> {
    properties: Vec<PropertyNode<'c>>,
}

/// A declaration followed by either a value or an optional nested block.
#[derive(Debug, Clone)]
pub struct PropertyNode<'c> {
    declaration: PropertyDeclarationNode<'c>,
    value: Option<PropertyValueNode<'c>>,
    end_of_line: Token<'c>,
    block: Option<PropertyBlockNode<'c>>,
}

/// `type` or `type name`, where the name is a word or quoted text.
#[derive(Debug, Clone)]
pub struct PropertyDeclarationNode<'c> {
    property_type: Token<'c>,
    property_name: Option<Token<'c>>,
}

/// `: text` or `>` followed by block text.
#[derive(Debug, Clone)]
pub struct PropertyValueNode<'c> {
    specifier: Token<'c>,
    text: Token<'c>,
}

/// An indented property list.
#[derive(Debug, Clone)]
pub struct PropertyBlockNode<'c> {
    indent: Token<'c>,
    property_list: PropertyListNode<'c>,
    outdent: Token<'c>,
}

impl<'c> FileNode<'c> {
    pub(crate) fn new(property_list: PropertyListNode<'c>, end_of_input: Token<'c>) -> Self {
        debug_assert_eq!(end_of_input.token_type(), TokenType::EndOfInput);
        Self {
            property_list,
            end_of_input,
        }
    }

    pub fn property_list(&self) -> &PropertyListNode<'c> {
        &self.property_list
    }

    pub fn end_of_input(&self) -> &Token<'c> {
        &self.end_of_input
    }

    pub fn position(&self) -> FileSpan<'c> {
        self.property_list.position().cover(&self.end_of_input.text())
    }

    /// Calls `visitor` for every node in pre-order, with the root at depth
    /// zero. Returns the number of nodes visited.
    pub fn visit_nodes<'a, F>(&'a self, mut visitor: F) -> usize
    where
        F: FnMut(Node<'a, 'c>, usize),
    {
        Node::File(self).visit_nodes(0, &mut visitor)
    }

    /// Calls `visitor` for every token in source order. Returns the number of
    /// tokens visited.
    pub fn visit_tokens<'a, F>(&'a self, mut visitor: F) -> usize
    where
        F: FnMut(&'a Token<'c>),
    {
        Node::File(self).visit_tokens(&mut visitor)
    }

    /// Indented outline of the tree: one line per node or token, two spaces
    /// per level. Tokens show their type and decoded value.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_node(&mut out, Node::File(self), 0);
        out
    }
}

fn dump_node(out: &mut String, node: Node<'_, '_>, depth: usize) {
    let _ = writeln!(out, "{:width$}{}", "", node.kind(), width = depth * 2);

    for child in node.children() {
        match child {
            SyntaxElement::Node(child) => dump_node(out, child, depth + 1),
            SyntaxElement::Token(token) => {
                let _ = write!(out, "{:width$}{}", "", token.token_type(), width = (depth + 1) * 2);
                if let Some(value) = token.value() {
                    let _ = write!(out, " {:?}", value.to_str_lossy());
                }
                out.push('\n');
            }
        }
    }
}

impl<'c> PropertyListNode<'c> {
    pub(crate) fn new(properties: Vec<PropertyNode<'c>>) -> Self {
        debug_assert!(!properties.is_empty());
        Self { properties }
    }

    pub fn properties(&self) -> &[PropertyNode<'c>] {
        &self.properties
    }

    pub fn position(&self) -> FileSpan<'c> {
        let first = self.properties[0].position();
        match self.properties.last() {
            Some(last) => first.cover(&last.position()),
            None => first,
        }
    }
}

impl<'c> PropertyNode<'c> {
    pub(crate) fn new(
        declaration: PropertyDeclarationNode<'c>,
        value: Option<PropertyValueNode<'c>>,
        end_of_line: Token<'c>,
        block: Option<PropertyBlockNode<'c>>,
    ) -> Self {
        debug_assert!(value.is_none() || block.is_none());
        Self {
            declaration,
            value,
            end_of_line,
            block,
        }
    }

    pub fn declaration(&self) -> &PropertyDeclarationNode<'c> {
        &self.declaration
    }

    pub fn value(&self) -> Option<&PropertyValueNode<'c>> {
        self.value.as_ref()
    }

    pub fn end_of_line(&self) -> &Token<'c> {
        &self.end_of_line
    }

    pub fn block(&self) -> Option<&PropertyBlockNode<'c>> {
        self.block.as_ref()
    }

    pub fn position(&self) -> FileSpan<'c> {
        let span = self.declaration.position().cover(&self.end_of_line.text());
        match &self.block {
            Some(block) => span.cover(&block.position()),
            None => span,
        }
    }
}

impl<'c> PropertyDeclarationNode<'c> {
    pub(crate) fn new(property_type: Token<'c>, property_name: Option<Token<'c>>) -> Self {
        debug_assert_eq!(property_type.token_type(), TokenType::Word);
        Self {
            property_type,
            property_name,
        }
    }

    pub fn property_type(&self) -> &Token<'c> {
        &self.property_type
    }

    pub fn property_name(&self) -> Option<&Token<'c>> {
        self.property_name.as_ref()
    }

    /// The decoded property type.
    pub fn type_value(&self) -> Option<&MotString> {
        self.property_type.value()
    }

    /// The decoded property name, if one was given.
    pub fn name_value(&self) -> Option<&MotString> {
        self.property_name.as_ref().and_then(|t| t.value())
    }

    pub fn position(&self) -> FileSpan<'c> {
        let span = self.property_type.text();
        match &self.property_name {
            Some(name) => span.cover(&name.text()),
            None => span,
        }
    }
}

impl<'c> PropertyValueNode<'c> {
    pub(crate) fn new(specifier: Token<'c>, text: Token<'c>) -> Self {
        Self { specifier, text }
    }

    /// The `:` or `>` token.
    pub fn specifier(&self) -> &Token<'c> {
        &self.specifier
    }

    pub fn text(&self) -> &Token<'c> {
        &self.text
    }

    pub fn value(&self) -> Option<&MotString> {
        self.text.value()
    }

    pub fn is_block_text(&self) -> bool {
        self.specifier.token_type() == TokenType::GreaterThan
    }

    pub fn position(&self) -> FileSpan<'c> {
        self.specifier.text().cover(&self.text.text())
    }
}

impl<'c> PropertyBlockNode<'c> {
    pub(crate) fn new(indent: Token<'c>, property_list: PropertyListNode<'c>, outdent: Token<'c>) -> Self {
        Self {
            indent,
            property_list,
            outdent,
        }
    }

    pub fn indent(&self) -> &Token<'c> {
        &self.indent
    }

    pub fn property_list(&self) -> &PropertyListNode<'c> {
        &self.property_list
    }

    pub fn outdent(&self) -> &Token<'c> {
        &self.outdent
    }

    pub fn position(&self) -> FileSpan<'c> {
        self.indent.text().cover(&self.outdent.text())
    }
}

/// A borrowed reference to any node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a, 'c> {
    File(&'a FileNode<'c>),
    PropertyList(&'a PropertyListNode<'c>),
    Property(&'a PropertyNode<'c>),
    PropertyDeclaration(&'a PropertyDeclarationNode<'c>),
    PropertyValue(&'a PropertyValueNode<'c>),
    PropertyBlock(&'a PropertyBlockNode<'c>),
}

/// A child of a node: another node or a token.
#[derive(Debug, Clone, Copy)]
pub enum SyntaxElement<'a, 'c> {
    Node(Node<'a, 'c>),
    Token(&'a Token<'c>),
}

impl<'a, 'c> Node<'a, 'c> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::PropertyList(_) => NodeKind::PropertyList,
            Node::Property(_) => NodeKind::Property,
            Node::PropertyDeclaration(_) => NodeKind::PropertyDeclaration,
            Node::PropertyValue(_) => NodeKind::PropertyValue,
            Node::PropertyBlock(_) => NodeKind::PropertyBlock,
        }
    }

    /// Span from the first token's text to the last token's text.
    pub fn position(&self) -> FileSpan<'c> {
        match self {
            Node::File(n) => n.position(),
            Node::PropertyList(n) => n.position(),
            Node::Property(n) => n.position(),
            Node::PropertyDeclaration(n) => n.position(),
            Node::PropertyValue(n) => n.position(),
            Node::PropertyBlock(n) => n.position(),
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<SyntaxElement<'a, 'c>> {
        let mut children = Vec::new();
        match *self {
            Node::File(n) => {
                children.push(SyntaxElement::Node(Node::PropertyList(&n.property_list)));
                children.push(SyntaxElement::Token(&n.end_of_input));
            }
            Node::PropertyList(n) => {
                children.extend(n.properties.iter().map(|p| SyntaxElement::Node(Node::Property(p))));
            }
            Node::Property(n) => {
                children.push(SyntaxElement::Node(Node::PropertyDeclaration(&n.declaration)));
                if let Some(value) = &n.value {
                    children.push(SyntaxElement::Node(Node::PropertyValue(value)));
                }
                children.push(SyntaxElement::Token(&n.end_of_line));
                if let Some(block) = &n.block {
                    children.push(SyntaxElement::Node(Node::PropertyBlock(block)));
                }
            }
            Node::PropertyDeclaration(n) => {
                children.push(SyntaxElement::Token(&n.property_type));
                if let Some(name) = &n.property_name {
                    children.push(SyntaxElement::Token(name));
                }
            }
            Node::PropertyValue(n) => {
                children.push(SyntaxElement::Token(&n.specifier));
                children.push(SyntaxElement::Token(&n.text));
            }
            Node::PropertyBlock(n) => {
                children.push(SyntaxElement::Token(&n.indent));
                children.push(SyntaxElement::Node(Node::PropertyList(&n.property_list)));
                children.push(SyntaxElement::Token(&n.outdent));
            }
        }
        children
    }

    fn visit_nodes<F>(self, depth: usize, visitor: &mut F) -> usize
    where
        F: FnMut(Node<'a, 'c>, usize),
    {
        visitor(self, depth);
        let mut count = 1;
        for child in self.children() {
            if let SyntaxElement::Node(node) = child {
                count += node.visit_nodes(depth + 1, visitor);
            }
        }
        count
    }

    fn visit_tokens<F>(self, visitor: &mut F) -> usize
    where
        F: FnMut(&'a Token<'c>),
    {
        let mut count = 0;
        for child in self.children() {
            match child {
                SyntaxElement::Node(node) => count += node.visit_tokens(visitor),
                SyntaxElement::Token(token) => {
                    visitor(token);
                    count += 1;
                }
            }
        }
        count
    }
}
