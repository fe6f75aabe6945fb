/*!
 * Sync Slice Demo
 *
 * Walks a `SyncSlice<String>` through creation, writes, iteration and
 * slicing, printing results to stdout. Logs go to stderr.
 */

use sync_slice::{init_tracing, SliceConfig, SyncSlice};
use tracing::info;

fn main() -> miette::Result<()> {
    init_tracing();

    let s: SyncSlice<String> = SyncSlice::with_config(SliceConfig::sized(2, 3).with_label("demo"));
    println!("{}", s.len());

    s.set(0, "hello".to_string())?;
    s.set(1, "world".to_string())?;
    println!("{}", s.len());

    s.append("!".to_string());
    println!("{}", s.len());

    for (index, value) in &s {
        println!("{} {}", index, value);
    }

    let next = s.slice(0, 1)?;
    next.append("cruel".to_string());
    next.append(s.get(1)?);
    next.extend(std::iter::repeat("bogus".to_string()).take(5));
    info!(len = next.len(), "Built view");

    next.range(|index, value| {
        if value == "bogus" {
            return false;
        }
        println!("{} {}", index, value);
        true
    });

    Ok(())
}
