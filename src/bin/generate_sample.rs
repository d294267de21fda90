use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Pick an item with the given relative weights.
    fn weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> &'a T {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (item, w) in items {
            if roll < *w {
                return item;
            }
            roll -= w;
        }
        &items[items.len() - 1].0
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Ananya", "Diya", "Ishaan", "Kabir", "Meera", "Nikhil", "Priya", "Rohan", "Saanvi",
    "Tara", "Vihaan", "Zara", "Arjun", "Kavya", "Reyansh",
];
const LAST_NAMES: &[&str] = &[
    "Sharma", "Iyer", "Khan", "Patel", "Das", "Reddy", "Singh", "Menon", "Gupta", "Nair",
];

fn main() -> Result<(), XlsxError> {
    let mut rng = SimpleRng::new(42);

    let genders = [("F", 0.49), ("M", 0.49), ("Other", 0.02)];
    let categories = [("General", 0.4), ("OBC", 0.3), ("SC", 0.18), ("ST", 0.12)];
    let sections = [("A", 1.0), ("B", 1.0), ("C", 1.0)];
    let transport = [("Bus", 0.5), ("Walk", 0.3), ("Bicycle", 0.2)];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let header = [
        "Student ID",
        "Name",
        "Gender",
        "Category",
        "Class",
        "Section",
        "Age",
        "Attendance (%)",
        "Transport",
        "Scholarship",
    ];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    let n_students = 120;
    for i in 0..n_students {
        let row = i as u32 + 1;
        let class = 6 + (rng.next_u64() % 5) as u32;
        let first = FIRST_NAMES[(rng.next_u64() as usize) % FIRST_NAMES.len()];
        let last = LAST_NAMES[(rng.next_u64() as usize) % LAST_NAMES.len()];
        let attendance = (70.0 + rng.next_f64() * 30.0).round();

        sheet.write_number(row, 0, 1000.0 + i as f64)?;
        sheet.write_string(row, 1, format!("{first} {last}"))?;
        sheet.write_string(row, 2, *rng.weighted(&genders))?;
        sheet.write_string(row, 3, *rng.weighted(&categories))?;
        sheet.write_number(row, 4, class as f64)?;
        sheet.write_string(row, 5, *rng.weighted(&sections))?;
        sheet.write_number(row, 6, (class + 5) as f64 + (rng.next_u64() % 2) as f64)?;
        sheet.write_number(row, 7, attendance)?;
        sheet.write_string(row, 8, *rng.weighted(&transport))?;
        sheet.write_boolean(row, 9, rng.next_f64() < 0.25)?;
    }

    let output_path = "students.xlsx";
    workbook.save(output_path)?;

    println!("Wrote {n_students} students to {output_path}");
    Ok(())
}
