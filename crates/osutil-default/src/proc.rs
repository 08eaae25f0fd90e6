// Parsers for /proc text files

/// `MemTotal` from /proc/meminfo, in kB.
pub fn parse_meminfo_total_kb(content: &str) -> Option<u64> {
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 && parts[0] == "MemTotal:" {
            return parts[1].parse().ok();
        }
    }
    None
}

/// Number of `processor` entries in /proc/cpuinfo.
pub fn count_processors(content: &str) -> u32 {
    content
        .lines()
        .filter(|l| l.starts_with("processor"))
        .count() as u32
}
