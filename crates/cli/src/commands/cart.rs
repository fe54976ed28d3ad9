//! Interactive cart session.
//!
//! Reads one command per line from stdin:
//!
//! - `add ID` - add one unit of a catalog product
//! - `inc ID` / `dec ID` - change an existing line by one unit
//! - `rm ID` - remove a line entirely
//! - `show` - print the cart
//! - `quit` - end the session

use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shopeasy_core::{CartMirror, ProductId};
use shopeasy_storefront::cart::{
    CartEvent, CartSync, IgnoreReason, ProductLookup, RemoteCart, SyncOutcome,
};
use shopeasy_storefront::error::{AppError, add_breadcrumb};
use shopeasy_storefront::state::Storefront;

const HELP: &str = "commands: add ID | inc ID | dec ID | rm ID | show | quit";

/// One line of session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartCommand {
    Add(ProductId),
    Increase(ProductId),
    Decrease(ProductId),
    Remove(ProductId),
    Show,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, Error)]
enum ParseCommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs a product ID")]
    MissingId(&'static str),
    #[error("invalid product ID `{0}`")]
    InvalidId(String),
}

impl FromStr for CartCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();

        let mut with_id = |name: &'static str,
                           make: fn(ProductId) -> Self|
         -> Result<Self, ParseCommandError> {
            let raw = words.next().ok_or(ParseCommandError::MissingId(name))?;
            raw.parse()
                .map(make)
                .map_err(|_| ParseCommandError::InvalidId(raw.to_string()))
        };

        match verb.as_str() {
            "add" => with_id("add", Self::Add),
            "inc" | "+" => with_id("inc", Self::Increase),
            "dec" | "-" => with_id("dec", Self::Decrease),
            "rm" | "remove" => with_id("rm", Self::Remove),
            "show" | "ls" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(ParseCommandError::Unknown(verb)),
        }
    }
}

/// Run the session until `quit` or end of input.
pub async fn session(store: &Storefront) -> Result<(), AppError> {
    match super::login_if_configured(store).await? {
        Some(profile) => info!(user = %profile.username, "Logged in"),
        None => warn!(
            "No credentials configured (SHOPEASY_USERNAME / SHOPEASY_PASSWORD); \
             cart calls will be rejected"
        ),
    }

    let cart = store.cart_session();
    let listener = spawn_reveal_listener(cart.subscribe());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();
    writeln!(out, "{HELP}")?;

    while let Some(line) = input.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<CartCommand>() {
            Ok(CartCommand::Quit) => break,
            Ok(CartCommand::Show) => write!(out, "{}", render_mirror(&cart.snapshot()))?,
            Ok(CartCommand::Help) => writeln!(out, "{HELP}")?,
            Ok(command) => {
                let report = apply(&cart, command).await;
                write!(out, "{report}")?;
            }
            Err(e) => writeln!(out, "{e}; {HELP}")?,
        }
    }

    listener.abort();
    Ok(())
}

/// Run one cart intent and describe what happened.
async fn apply<R: RemoteCart, C: ProductLookup>(
    cart: &CartSync<R, C>,
    command: CartCommand,
) -> String {
    let (label, result) = match command {
        CartCommand::Add(id) => ("add", cart.add_item(id).await),
        CartCommand::Increase(id) => ("inc", cart.increase_quantity(id).await),
        CartCommand::Decrease(id) => ("dec", cart.decrease_quantity(id).await),
        CartCommand::Remove(id) => ("rm", cart.remove_all_of_item(id).await),
        CartCommand::Show | CartCommand::Help | CartCommand::Quit => return String::new(),
    };

    match result {
        Ok(SyncOutcome::Applied { product_id, .. }) => {
            let id = product_id.to_string();
            add_breadcrumb("cart", label, Some(&[("product_id", id.as_str())]));
            render_mirror(&cart.snapshot())
        }
        Ok(SyncOutcome::Ignored { product_id, reason }) => {
            let why = match reason {
                IgnoreReason::UnknownProduct => "is not in the catalog",
                IgnoreReason::NotInCart => "is not in the cart",
                IgnoreReason::QuantityLimit => "is already at the maximum quantity",
            };
            format!("Nothing to do: product {product_id} {why}\n")
        }
        Err(e) => {
            let message = format!("Cart unchanged: {e}");
            let err = AppError::from(e);
            let hint = if err.is_transient() { " (try again)" } else { "" };
            let message = format!("{message}{hint}\n");
            err.report();
            message
        }
    }
}

/// Log reveal-cart signals while the session runs.
fn spawn_reveal_listener(mut events: broadcast::Receiver<CartEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CartEvent::RevealCart) => info!("Item added, showing cart"),
                Ok(CartEvent::MirrorChanged(_)) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// The cart as printed after each applied change.
fn render_mirror(mirror: &CartMirror) -> String {
    if mirror.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = format!("Cart ({} items)\n", mirror.total_quantity());
    for line in mirror {
        let _ = writeln!(
            out,
            "  {:>3} x {:<30} {}",
            line.quantity(),
            line.product().display_name(),
            line.subtotal()
        );
    }
    if let Some(subtotal) = mirror.subtotal() {
        let _ = writeln!(out, "Subtotal: {subtotal}");
    }
    out
}
