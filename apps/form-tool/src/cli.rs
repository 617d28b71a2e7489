use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory holding the snapshot
    #[arg(long, global = true, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Maximum parent hops walked by the category cycle check
    #[arg(long, global = true, default_value_t = 1024)]
    pub max_ancestor_depth: usize,

    /// Id of the acting user
    #[arg(long, global = true, default_value_t = 1)]
    pub user: u64,

    /// Act with elevated privilege
    #[arg(long, global = true)]
    pub admin: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage form schemas
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// Submit and manage form records
    #[command(subcommand)]
    Record(RecordCommand),

    /// Maintain the category tree
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Track file membership in categories
    #[command(subcommand)]
    File(FileCommand),

    /// Validate a data file against a schema file without touching the snapshot
    Validate {
        /// JSON file with `name`, optional `description` and `fields`
        #[arg(long)]
        schema: PathBuf,

        /// JSON file holding the record payload object
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Define a new schema
    Define {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// JSON file holding the field list (defaults to no fields)
        #[arg(long)]
        fields: Option<PathBuf>,
    },

    /// Replace a schema's name, description or field list
    Revise {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// JSON file holding the replacement field list
        #[arg(long)]
        fields: Option<PathBuf>,
    },

    /// Delete a schema that has no records
    Retire { id: u64 },

    /// Print one schema
    Show { id: u64 },

    /// List visible schemas, newest first
    List {
        /// Substring matched against name and description
        #[arg(short, long)]
        keyword: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Validate and store a record
    Submit {
        #[arg(long)]
        schema: u64,

        /// JSON file holding the payload object
        #[arg(long)]
        data: PathBuf,
    },

    /// Replace a record's payload
    Revise {
        id: u64,

        /// JSON file holding the payload object
        #[arg(long)]
        data: PathBuf,
    },

    /// Print one record
    Show { id: u64 },

    /// List the records of a schema, newest first
    List {
        #[arg(long)]
        schema: u64,
    },

    /// Delete a record
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Create a category
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        parent: Option<u64>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value_t = 0)]
        sort: i32,
    },

    /// Update a category
    Update(CategoryUpdateArgs),

    /// Delete a category without children or live files
    Delete { id: u64 },

    /// Print the nested category tree
    Tree,
}

#[derive(Args, Debug)]
pub struct CategoryUpdateArgs {
    pub id: u64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// New parent category
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<u64>,

    /// Move the category to the root level
    #[arg(long)]
    pub root: bool,

    #[arg(long)]
    pub sort: Option<i32>,

    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Register a file in a category
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: Option<u64>,
    },

    /// Mark a file as deleted
    Trash { id: u64 },
}
