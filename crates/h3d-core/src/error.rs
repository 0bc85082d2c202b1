use thiserror::Error;

#[derive(Debug, Error)]
pub enum H3dError {
    /// Invalid evaluator construction (control points, knots, domains).
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, H3dError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = H3dError::NotImplemented("cubic length".into());
        assert_eq!(e.to_string(), "Not implemented: cubic length");
        let e = H3dError::InvalidParameter("un must be positive".into());
        assert_eq!(e.to_string(), "Invalid parameter: un must be positive");
    }
}
