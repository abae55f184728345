//! chirpstore CLI
//!
//! Offline inspection and maintenance of a snapshot file. Do not point it
//! at a file a running server is syncing; the server will overwrite it.

use std::path::{Path, PathBuf};

use chirpstore::snapshot::{self, file};
use chirpstore::{bootstrap, Config, Post, RecordStore, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// chirpstore CLI
#[derive(Parser, Debug)]
#[command(name = "chirpstore-cli")]
#[command(about = "Inspect and edit a chirpstore snapshot file")]
struct Args {
    /// Snapshot file [env: CHIRPSTORE_DB_PATH, default: ./data.json]
    #[arg(short, long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty snapshot if none exists
    Init,

    /// Validate the snapshot and print counts
    Check,

    /// List posts
    Posts {
        /// Only posts by this author
        #[arg(short, long)]
        author: Option<u64>,
    },

    /// List users (credentials omitted)
    Users,

    /// Show one post
    Get {
        /// Post id
        id: u64,
    },

    /// Add a post
    Add {
        /// Author user id
        #[arg(short, long)]
        author: u64,

        /// Post body
        body: String,
    },

    /// Delete a post (later posts are renumbered)
    Del {
        /// Post id
        id: u64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let db = match args.db {
        Some(db) => Ok(db),
        None => Config::from_env().map(|config| config.snapshot_path),
    };

    if let Err(e) = db.and_then(|db| run(&db, args.command)) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(db: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            if file::ensure_exists(db)? {
                println!("created {}", db.display());
            } else {
                println!("{} already exists", db.display());
            }
        }
        Commands::Check => {
            let bytes = file::read(db)?;
            let document = snapshot::decode(&bytes)?;
            println!(
                "ok: {} posts, {} users, {} bytes, crc32 {:08x}",
                document.posts.len(),
                document.users.len(),
                bytes.len(),
                snapshot::checksum(&bytes)
            );
        }
        Commands::Posts { author } => {
            let store = bootstrap::load(db)?;
            let posts = match author {
                Some(author_id) => store.posts_by_author(author_id),
                None => store.list_posts(),
            };
            for post in posts {
                print_post(&post);
            }
        }
        Commands::Users => {
            let store = bootstrap::load(db)?;
            for user in store.list_users() {
                println!(
                    "{}\t{}\tupgraded={}\trefresh={}",
                    user.id,
                    user.email,
                    user.is_upgraded,
                    user.refresh_secret.is_some()
                );
            }
        }
        Commands::Get { id } => {
            let store = bootstrap::load(db)?;
            print_post(&store.get_post(id)?);
        }
        Commands::Add { author, body } => {
            let store = bootstrap::load(db)?;
            let post = store.insert_post(Post::new(body, author))?;
            persist(&store, db)?;
            print_post(&post);
        }
        Commands::Del { id } => {
            let store = bootstrap::load(db)?;
            match store.delete_post(id) {
                Some(removed) => {
                    persist(&store, db)?;
                    println!("deleted {}; {} posts remain", removed.id, store.post_count());
                }
                None => println!("no post {}", id),
            }
        }
    }
    Ok(())
}

fn persist(store: &RecordStore, db: &Path) -> Result<()> {
    let bytes = store.snapshot_now()?;
    file::write_atomic(db, &bytes)
}

fn print_post(post: &Post) {
    println!("{}\tauthor={}\t{}", post.id, post.author_id, post.body);
}
