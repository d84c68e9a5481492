pub mod add;
pub mod delete;
pub mod generate;
pub mod list;
pub mod now;
pub mod verify;

pub enum CommandType {
    Now,
    Verify,
    Add,
    Delete,
    List,
    Generate,
}

impl CommandType {
    pub fn as_str(&self) -> &str {
        match self {
            CommandType::Now => "now",
            CommandType::Verify => "verify",
            CommandType::Add => "add",
            CommandType::Delete => "delete",
            CommandType::List => "list",
            CommandType::Generate => "generate",
        }
    }
}
