use clap::{Args, Parser, Subcommand, ValueEnum};
use mocking_api::{DocumentQuery, FieldType, SortOrder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mocking")]
#[command(about = "Command line client for MockingCode mock APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (YAML)
    #[arg(long, short = 'c', global = true, env = "MOCKING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the MockingCode API
    #[arg(long, global = true, env = "MOCKING_API_URL")]
    pub api_url: Option<String>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Also log to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and keep the token
    Login(CredentialArgs),
    /// Create an account, then log in
    Register(CredentialArgs),
    /// Forget the stored token
    Logout,
    /// Show whether a token is held
    Status,
    /// Exchange a refresh token for a new access token
    Refresh { refresh_token: String },
    /// Check that the API is reachable
    Health,
    /// Manage projects
    Projects(ProjectsArgs),
    /// Manage the collections of a project
    Collections(CollectionsArgs),
    /// Edit the documents of a collection
    Documents(DocumentsArgs),
    /// Edit a collection's schema and generate data
    Schema(SchemaArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    pub email: String,
    /// Password; read from MOCKING_PASSWORD when omitted
    #[arg(long, env = "MOCKING_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommands {
    List,
    Show {
        id: i64,
    },
    Create {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CollectionsArgs {
    /// Project id
    pub project: i64,
    #[command(subcommand)]
    pub command: CollectionCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CollectionCommands {
    /// List collections with document counts
    List,
    Create {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
        /// JSON file with the field schema; only `id` when omitted
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    Delete {
        /// Collection name or id
        collection: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DocumentsArgs {
    /// Project id
    pub project: i64,
    /// Collection name or id
    pub collection: String,
    #[command(subcommand)]
    pub command: DocumentCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DocumentCommands {
    List(ListArgs),
    /// Print an example document for the schema
    Template,
    /// Print a document as editable JSON (id removed, gaps filled)
    Show { id: String },
    /// Print every document as one editable array
    Dump,
    /// Create a document from JSON (file or stdin)
    Create {
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Replace the fields of one document from JSON (file or stdin)
    Update {
        id: String,
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Update every document of a JSON array; each entry needs an id
    Bulk {
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    Delete {
        id: String,
    },
    /// Delete every document
    Flush,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub limit: Option<i64>,
    #[arg(long)]
    pub offset: Option<i64>,
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,
}

impl ListArgs {
    pub fn to_query(&self) -> DocumentQuery {
        DocumentQuery {
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.clone(),
            order: self.order.map(SortOrder::from),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Project id
    pub project: i64,
    /// Collection name or id
    pub collection: String,
    #[command(subcommand)]
    pub command: SchemaCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SchemaCommands {
    /// Print the schema, `id` first
    Show,
    AddField {
        name: String,
        #[arg(long = "type", short = 't', value_enum, default_value = "string")]
        field_type: TypeArg,
        #[arg(long, short)]
        format: Option<String>,
        #[arg(long)]
        required: bool,
    },
    RemoveField {
        name: String,
    },
    /// Generate documents on the server and store them
    Generate {
        #[arg(long, short = 'n', default_value_t = 10)]
        count: u32,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArg {
    String,
    Number,
    Boolean,
    Date,
}

impl From<TypeArg> for FieldType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::String => FieldType::String,
            TypeArg::Number => FieldType::Number,
            TypeArg::Boolean => FieldType::Boolean,
            TypeArg::Date => FieldType::Date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_list_query() {
        let cli = Cli::try_parse_from([
            "mocking", "documents", "3", "users", "list", "--limit", "5", "--order", "desc",
        ])
        .unwrap();
        let Commands::Documents(args) = cli.command else {
            panic!("expected documents command");
        };
        assert_eq!(args.project, 3);
        assert_eq!(args.collection, "users");
        let DocumentCommands::List(list) = args.command else {
            panic!("expected list");
        };
        let query = list.to_query();
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.order, Some(SortOrder::Desc));
    }

    #[test]
    fn test_parse_add_field() {
        let cli = Cli::try_parse_from([
            "mocking", "-y", "schema", "1", "users", "add-field", "email", "--format", "email",
            "--required",
        ])
        .unwrap();
        assert!(cli.yes);
        match cli.command {
            Commands::Schema(SchemaArgs {
                command:
                    SchemaCommands::AddField {
                        name,
                        field_type,
                        format,
                        required,
                    },
                ..
            }) => {
                assert_eq!(name, "email");
                assert_eq!(FieldType::from(field_type), FieldType::String);
                assert_eq!(format.as_deref(), Some("email"));
                assert!(required);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
