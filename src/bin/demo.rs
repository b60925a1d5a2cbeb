// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use skipset::SkipSet;

fn print_summary(set: &SkipSet<i32>) {
    println!(
        "SkipSet (len: {}, height: {})",
        set.len(),
        set.height()
    );
    print!("{}", set);
}

fn main() {
    let mut set = SkipSet::new();

    for v in [3, 6, 7, 9, 12, 19, 17, 26, 21, 25] {
        set.insert(v);
    }
    print_summary(&set);

    println!("contains 19: {}", set.contains(&19));
    println!("contains 20: {}", set.contains(&20));

    set.delete(&19);
    set.delete(&25);
    print_summary(&set);
}
