//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! souq checkout --name "Zainab Ali" --phone 07701234567 \
//!     --lat 33.3152 --lng 44.3661 --notes "Ring twice"
//! ```
//!
//! The address is optional when `GOOGLE_MAPS_API_KEY` is set: it is filled
//! from the delivery coordinates.

use clap::Args;
use souq_core::Coordinates;
use souq_storefront::Storefront;
use souq_storefront::checkout::CheckoutForm;
use souq_storefront::handshake::ViewportSignals;

/// Contact, delivery and device details for one checkout.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Full name of the recipient
    #[arg(long, default_value = "")]
    pub name: String,

    /// Contact phone (+964XXXXXXXXXX or 0XXXXXXXXXX)
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Optional second contact phone
    #[arg(long, default_value = "")]
    pub phone2: String,

    /// Delivery address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Delivery notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Delivery latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Delivery longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Device signals reported to the validation authority.
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Key presses while filling the form
    #[arg(long, default_value_t = 0)]
    pub key_ups: u32,

    /// Taps or clicks while on the checkout screen
    #[arg(long, default_value_t = 1)]
    pub taps: u32,

    #[arg(long, default_value_t = 1280)]
    pub screen_width: u32,

    #[arg(long, default_value_t = 800)]
    pub screen_height: u32,

    #[arg(long, default_value_t = 1280)]
    pub inner_width: u32,

    #[arg(long, default_value_t = 720)]
    pub inner_height: u32,

    /// Position of the submit control, `top,left` in pixels
    #[arg(long, value_parser = parse_position, default_value = "0,0")]
    pub submit_at: (f64, f64),
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let (top, left) = s
        .split_once(',')
        .ok_or_else(|| format!("expected TOP,LEFT, got '{s}'"))?;
    let top = top.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let left = left.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((top, left))
}

impl DeviceArgs {
    fn viewport(&self) -> ViewportSignals {
        let (trigger_top, trigger_left) = self.submit_at;
        ViewportSignals {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            inner_width: self.inner_width,
            inner_height: self.inner_height,
            trigger_top,
            trigger_left,
        }
    }
}

/// Place an order for the current cart.
///
/// # Errors
///
/// Returns an error if the coordinates are invalid or the checkout fails.
/// The failure is also printed as a user-facing notification.
pub async fn run(
    storefront: &Storefront,
    args: CheckoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = storefront.enter_checkout();
    println!("Subtotal:  {}", summary.item_total.display());
    println!("Delivery:  {}", summary.delivery_fee.display());
    println!("Total:     {}", summary.grand_total.display());

    let counters = storefront.handshake().counters();
    for _ in 0..args.device.key_ups {
        counters.record_key_up();
    }
    for _ in 0..args.device.taps {
        counters.record_tap();
    }

    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
        _ => None,
    };

    let mut address = args.address;
    if address.trim().is_empty()
        && let Some(location) = location
        && let Some(suggested) = storefront.suggest_address(location).await
    {
        println!("Address:   {suggested}");
        address = suggested;
    }

    let form = CheckoutForm {
        full_name: args.name,
        phone: args.phone,
        second_phone: args.phone2,
        address,
        notes: args.notes,
    };

    match storefront
        .checkout(&form, location, &args.device.viewport())
        .await
    {
        Ok(record) => {
            println!("Order placed: #{}", record.order_number);
            Ok(())
        }
        Err(e) => {
            let notification = e.notification(storefront.config().environment);
            println!("{}: {}", notification.title, notification.description);
            if e.is_retryable() {
                println!("Your cart was kept. Run the checkout again to retry.");
            }
            Err(e.into())
        }
    }
}
