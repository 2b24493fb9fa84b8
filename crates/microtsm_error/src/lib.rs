use std::{
  fmt::{self, Display},
  ops::{Deref, DerefMut},
};

/// One or more failures collected while handling a single unit of work, e.g. every
/// parser diagnostic reported for one module source.
#[derive(Debug)]
pub struct BuildError(pub Vec<anyhow::Error>);

impl BuildError {
  pub fn into_first(self) -> Option<anyhow::Error> {
    self.0.into_iter().next()
  }
}

impl Deref for BuildError {
  type Target = Vec<anyhow::Error>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, error) in self.0.iter().enumerate() {
      if idx > 0 {
        f.write_str("\n")?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![error])
  }
}

impl From<Vec<anyhow::Error>> for BuildError {
  fn from(errors: Vec<anyhow::Error>) -> Self {
    Self(errors)
  }
}

pub type BuildResult<T> = anyhow::Result<T, BuildError>;

#[test]
fn display_joins_every_error() {
  let error = BuildError::from(vec![anyhow::anyhow!("first"), anyhow::anyhow!("second")]);
  assert_eq!(error.to_string(), "first\nsecond");
  assert_eq!(error.into_first().map(|e| e.to_string()).as_deref(), Some("first"));
}
