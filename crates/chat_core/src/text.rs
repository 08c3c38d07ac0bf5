//! Fixed localized strings shown to the user.
//!
//! The product ships in Amharic; these strings are part of the contract
//! (the reply-failure text doubles as the permanent content of a failed
//! assistant message) and must not be reworded casually.

/// The assistant greeting every empty conversation starts with.
pub const GREETING: &str = "ጤና ይስጥልኝ! እኔ ዝፋን ነኝ። በኢትዮጵያ የሕግ ጉዳዮች ላይ የተዘጋጁ ሰነዶችን መሠረት አድርጌ ጥያቄዎችዎን ለመመለስ ዝግጁ ነኝ። እንዴት ልርዳዎት?";

/// Permanent content of an assistant message whose stream failed.
pub const REPLY_ERROR: &str = "ይቅርታ፣ ምላሽ ለመስጠት ችግር አጋጥሞኛል። እባክዎ ትንሽ ቆይተው እንደገና ይሞክሩ።";

/// Default title for the n-th conversation ("ውይይት n").
pub fn default_title(n: usize) -> String {
    format!("ውይይት {}", n)
}
