pub fn ranges_to_integers(s: &str) -> Result<Vec<u32>, &'static str> {
    // 形如`13-18,20`，区间两端都包含；保持给出的顺序，重复的只保留第一次。
    const ERR: &str = "整数范围格式错误";
    let mut v = Vec::<u32>::new();
    let mut push = |d: u32| {
        if !v.contains(&d) {
            v.push(d);
        }
    };
    for ranges in s.split(',') {
        let mut d_iter = ranges.trim().split('-');
        let d1: u32 = d_iter.next().ok_or(ERR)?.parse().map_err(|_| ERR)?;
        if let Some(d2) = d_iter.next() {
            let d2: u32 = d2.parse().map_err(|_| ERR)?;
            if d2 < d1 {
                return Err(ERR);
            }
            (d1..=d2).for_each(&mut push);
            if d_iter.next().is_some() {
                return Err(ERR);
            }
        } else {
            push(d1);
        }
    }
    Ok(v)
}
