use crate::error::LoadError;
use crate::registry::Program;
use diagnostics::FileId;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
  Unvisited,
  OnStack,
  Done,
}

/// Depth-first walk of the include edges, rejecting any cycle. Returns the files in post-order,
/// so every file appears after everything it includes.
pub fn check_cycles(programs: &[Program]) -> Result<Vec<FileId>, LoadError> {
  let mut state = vec![VisitState::Unvisited; programs.len()];
  let mut order = Vec::with_capacity(programs.len());
  // Each frame is a file and the index of its next include to follow.
  let mut stack: Vec<(FileId, usize)> = Vec::new();
  for root in programs {
    if state[root.file.index()] != VisitState::Unvisited {
      continue;
    };
    state[root.file.index()] = VisitState::OnStack;
    stack.push((root.file, 0));
    while let Some(top) = stack.len().checked_sub(1) {
      let (file, next) = stack[top];
      let program = &programs[file.index()];
      let Some(include) = program.includes.get(next) else {
        state[file.index()] = VisitState::Done;
        order.push(file);
        stack.pop();
        continue;
      };
      stack[top].1 += 1;
      match state[include.target.index()] {
        VisitState::Unvisited => {
          state[include.target.index()] = VisitState::OnStack;
          stack.push((include.target, 0));
        }
        VisitState::OnStack => {
          let start = stack
            .iter()
            .position(|&(f, _)| f == include.target)
            .unwrap_or(0);
          let cycle = stack[start..]
            .iter()
            .map(|&(f, _)| f)
            .chain(std::iter::once(include.target))
            .map(|f| programs[f.index()].path.to_string())
            .collect();
          return Err(LoadError::CircularInclude {
            cycle,
            location: program.location(include.loc),
          });
        }
        VisitState::Done => {}
      };
    }
  }
  Ok(order)
}
