use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    Backend, Client, Credentials, Listing, OrderAction, PageQuery, loader,
    validation::{FormMode, GiftForm, ImageFile, validate_gift_form},
    views::OrderRow,
};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "dono_admin")]
#[command(about = "Admin utilities for the Dono gift platform")]
struct Cli {
    /// Backend API root (also read from `DONO_BASE_URL`).
    #[arg(long, env = "DONO_BASE_URL")]
    base_url: String,

    /// Bearer token (also read from `DONO_TOKEN`).
    #[arg(long, env = "DONO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Username for basic auth; the password is prompted.
    #[arg(long, env = "DONO_USERNAME")]
    username: Option<String>,

    /// Log filter for stderr output.
    #[arg(long, env = "DONO_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Orders(Orders),
    Gifts(Gifts),
    Users(Users),
    Groups(Groups),
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = engine::DEFAULT_PAGE_SIZE)]
    size: u32,
    /// Fetch every element with the unpaged endpoint.
    #[arg(long, conflicts_with_all = ["page", "size"])]
    all: bool,
}

impl PageArgs {
    fn query(&self) -> PageQuery {
        if self.all {
            PageQuery::All
        } else {
            PageQuery::Page {
                index: self.page,
                size: self.size.max(1),
            }
        }
    }
}

#[derive(Args, Debug)]
struct Orders {
    #[command(subcommand)]
    command: OrdersCommand,
}

#[derive(Subcommand, Debug)]
enum OrdersCommand {
    List(PageArgs),
    SetStatus(SetStatusArgs),
}

#[derive(Args, Debug)]
struct SetStatusArgs {
    id: i64,
    /// confirm, deliver or cancel.
    action: String,
}

#[derive(Args, Debug)]
struct Gifts {
    #[command(subcommand)]
    command: GiftsCommand,
}

#[derive(Subcommand, Debug)]
enum GiftsCommand {
    List(PageArgs),
    Create(GiftCreateArgs),
    Update(GiftUpdateArgs),
    Delete { id: i64 },
    Photo(PhotoArgs),
}

#[derive(Args, Debug)]
struct GiftCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    stock: String,
    /// Image file to upload; repeat for more images.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct GiftUpdateArgs {
    id: i64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    stock: Option<String>,
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct PhotoArgs {
    gift: i64,
    photo: i64,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct Users {
    #[command(subcommand)]
    command: ListCommand,
}

#[derive(Args, Debug)]
struct Groups {
    #[command(subcommand)]
    command: ListCommand,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    List(PageArgs),
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn credentials(cli: &Cli) -> CliResult<Credentials> {
    if let Some(token) = &cli.token {
        return Ok(Credentials::bearer(token.clone()));
    }
    let Some(username) = &cli.username else {
        return Err("either --token or --username is required".into());
    };
    let password = prompt_password("Password: ")?;
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(Credentials::basic(username.clone(), password))
}

fn print_footer<T>(listing: &Listing<T>, query: PageQuery) {
    match query {
        PageQuery::All => println!("-- {} elementi", listing.total_elements),
        PageQuery::Page { index, .. } => println!(
            "-- pagina {}/{} ({} elementi)",
            index + 1,
            listing.total_pages.max(1),
            listing.total_elements
        ),
    }
}

fn print_orders(listing: &Listing<OrderRow>) {
    for order in &listing.items {
        println!(
            "#{:<5} {:<24} {:<20} {:<17} {}",
            order.id,
            order.gift_name,
            order.customer,
            order.ordered_at,
            order.status_label()
        );
    }
}

fn exit_invalid(errors: engine::validation::FieldErrors) -> ! {
    tracing::warn!(fields = errors.len(), "gift form rejected");
    for (field, err) in errors {
        eprintln!("{field}: {err}");
    }
    std::process::exit(2);
}

fn to_images(paths: Vec<PathBuf>) -> Vec<ImageFile> {
    paths.into_iter().map(ImageFile::from_path).collect()
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "dono_admin={level},engine={level}",
            level = cli.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = Client::new(&cli.base_url)?;
    let credentials = credentials(&cli)?;
    tracing::debug!(base_url = %client.base_url(), command = ?cli.command, "running command");

    match cli.command {
        Command::Orders(Orders { command }) => match command {
            OrdersCommand::List(page) => {
                let query = page.query();
                let listing = loader::load_orders(&client, &credentials, query).await?;
                print_orders(&listing);
                print_footer(&listing, query);
            }
            OrdersCommand::SetStatus(args) => {
                let Some(action) = OrderAction::parse(&args.action) else {
                    eprintln!("unknown action: {} (confirm, deliver, cancel)", args.action);
                    std::process::exit(2);
                };
                let orders = client.orders(&credentials, PageQuery::All).await?;
                let Some(order) = orders.items.iter().find(|order| order.id == args.id) else {
                    tracing::warn!(order_id = args.id, "order not found");
                    eprintln!("order not found: {}", args.id);
                    std::process::exit(1);
                };
                let current = engine::OrderStatus::from_code_lossy(&order.status);
                let next = match current.apply(action) {
                    Ok(next) => next,
                    Err(err) => {
                        tracing::warn!(order_id = args.id, %err, "transition rejected");
                        eprintln!("{err}");
                        std::process::exit(1);
                    }
                };
                client
                    .update_order_status(&credentials, args.id, next)
                    .await?;
                println!("order #{}: {}", args.id, next.label());
            }
        },
        Command::Gifts(Gifts { command }) => match command {
            GiftsCommand::List(page) => {
                let query = page.query();
                let listing = loader::load_gifts(&client, &credentials, query).await?;
                for gift in &listing.items {
                    println!(
                        "#{:<5} {:<28} {:>10} {:>6} foto: {}",
                        gift.id,
                        gift.name,
                        gift.price_label(),
                        gift.stock,
                        gift.photos.len()
                    );
                }
                print_footer(&listing, query);
            }
            GiftsCommand::Create(args) => {
                let form = GiftForm {
                    name: args.name,
                    price: args.price,
                    stock: args.stock,
                    images: to_images(args.images),
                };
                let valid = validate_gift_form(&form, FormMode::Create)
                    .unwrap_or_else(|errors| exit_invalid(errors));
                let present = client.save_gift(&credentials, None, &valid).await?;
                println!("created gift: {} (#{})", present.name, present.id);
            }
            GiftsCommand::Update(args) => {
                let gifts = client.presents(&credentials, PageQuery::All).await?;
                let Some(current) = gifts.items.into_iter().find(|gift| gift.id == args.id) else {
                    tracing::warn!(present_id = args.id, "gift not found");
                    eprintln!("gift not found: {}", args.id);
                    std::process::exit(1);
                };
                let form = GiftForm {
                    name: args.name.unwrap_or(current.name),
                    price: args.price.unwrap_or_else(|| current.price.to_string()),
                    stock: args.stock.unwrap_or_else(|| current.stock.to_string()),
                    images: to_images(args.images),
                };
                let mode = FormMode::Edit {
                    existing_photos: current.photos.len(),
                };
                let valid =
                    validate_gift_form(&form, mode).unwrap_or_else(|errors| exit_invalid(errors));
                let present = client
                    .save_gift(&credentials, Some(args.id), &valid)
                    .await?;
                println!("updated gift: {} (#{})", present.name, present.id);
            }
            GiftsCommand::Delete { id } => {
                client.delete_present(&credentials, id).await?;
                println!("deleted gift #{id}");
            }
            GiftsCommand::Photo(args) => {
                let bytes = client.photo(&credentials, args.gift, args.photo).await?;
                tokio::fs::write(&args.out, &bytes).await?;
                println!("saved {} bytes to {}", bytes.len(), args.out.display());
            }
        },
        Command::Users(Users {
            command: ListCommand::List(page),
        }) => {
            let query = page.query();
            let listing = loader::load_users(&client, &credentials, query).await?;
            for user in &listing.items {
                println!(
                    "#{:<5} {:<20} {:<28} {:<10} {}",
                    user.id, user.username, user.email, user.role, user.group
                );
            }
            print_footer(&listing, query);
        }
        Command::Groups(Groups {
            command: ListCommand::List(page),
        }) => {
            let query = page.query();
            let listing = loader::load_groups(&client, &credentials, query).await?;
            for group in &listing.items {
                println!(
                    "#{:<5} {:<24} membri: {:<4} {}",
                    group.id, group.name, group.members, group.description
                );
            }
            print_footer(&listing, query);
        }
    }

    Ok(())
}
