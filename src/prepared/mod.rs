mod statement;
mod template;

pub use statement::PreparedStatement;
pub use template::PreparedStatementTemplate;
