use crate::error::LoadError;
use crate::registry::Program;
use ahash::HashMap;
use ahash::HashMapExt;
use diagnostics::FileId;
use parse_thrift::ast::stx::Definition;
use parse_thrift::loc::Loc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
  Const,
  Typedef,
  Enum,
  Struct,
  Service,
}

impl DeclKind {
  pub fn of(def: &Definition) -> DeclKind {
    match def {
      Definition::Const(_) => DeclKind::Const,
      Definition::Typedef(_) => DeclKind::Typedef,
      Definition::Enum(_) => DeclKind::Enum,
      Definition::Struct(_) => DeclKind::Struct,
      Definition::Service(_) => DeclKind::Service,
    }
  }
}

/// A declaration in its own program, by position in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalDecl {
  pub kind: DeclKind,
  pub index: usize,
  pub name_loc: Loc,
}

/// Names visible inside one program: its own declarations (types and constants share one
/// namespace) and the aliases of the files it includes. Declarations of included files are only
/// reachable through their alias, and never transitively.
#[derive(Debug, Default)]
pub struct SymbolTable {
  pub decls: HashMap<String, LocalDecl>,
  pub aliases: HashMap<String, FileId>,
}

impl SymbolTable {
  pub fn decl(&self, name: &str) -> Option<&LocalDecl> {
    self.decls.get(name)
  }

  pub fn alias(&self, alias: &str) -> Option<FileId> {
    self.aliases.get(alias).copied()
  }
}

pub fn build(program: &Program) -> Result<SymbolTable, LoadError> {
  let mut decls = HashMap::<String, LocalDecl>::new();
  for (index, def) in program.document.stx.definitions.iter().enumerate() {
    let name_loc = def.stx.name_loc();
    if let Some(previous) = decls.get(def.stx.name()) {
      return Err(LoadError::DuplicateDefinition {
        name: def.stx.name().to_string(),
        location: program.location(name_loc),
        previous: program.location(previous.name_loc),
      });
    };
    decls.insert(def.stx.name().to_string(), LocalDecl {
      kind: DeclKind::of(&def.stx),
      index,
      name_loc,
    });
  }

  let mut aliases = HashMap::<String, FileId>::new();
  let mut alias_locs = HashMap::<&str, Loc>::new();
  for include in &program.includes {
    match aliases.get(&include.alias) {
      // Including one file twice is harmless.
      Some(&target) if target == include.target => {}
      Some(_) => {
        let previous = alias_locs.get(include.alias.as_str()).copied().unwrap_or(include.loc);
        return Err(LoadError::DuplicateDefinition {
          name: include.alias.clone(),
          location: program.location(include.loc),
          previous: program.location(previous),
        });
      }
      None => {
        aliases.insert(include.alias.clone(), include.target);
        alias_locs.insert(&include.alias, include.loc);
      }
    };
  }
  Ok(SymbolTable { decls, aliases })
}
