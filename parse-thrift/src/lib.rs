use ast::node::Node;
use ast::stx::Document;
use error::SyntaxResult;
use lex::lex_all;
use lex::Lexer;
use parse::Parser;

pub mod ast;
pub mod error;
pub mod lex;
pub mod loc;
pub mod parse;
pub mod token;

/// Parses one Thrift IDL document. Type and constant references are left as written; linking
/// them is the job of a loader.
pub fn parse(source: &str) -> SyntaxResult<Node<Document>> {
  let mut lexer = Lexer::new(source);
  let tokens = lex_all(&mut lexer)?;
  let mut parser = Parser::new(source, tokens);
  parser.parse_document()
}
