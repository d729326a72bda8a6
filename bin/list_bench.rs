use kvlist::{FileUnrolledList, ListOptions};
use procfs::CpuInfo;
use rand::distributions::Uniform;
use rand::Rng;
use tempfile::TempDir;

const NUM_KVS: i64 = 200000;
const KEY_SIZE: usize = std::mem::size_of::<i64>();
const VALUE_SIZE: usize = 100;
const RAW_SIZE: f64 = ((KEY_SIZE + VALUE_SIZE) * NUM_KVS as usize) as f64 / 1024f64 / 1024f64;

type Value = [u8; VALUE_SIZE];
type List = FileUnrolledList<i64, Value>;

fn print_environment() {
    println!("kvlist: version {}", env!("CARGO_PKG_VERSION"));

    let datetime = chrono::Utc::now();
    println!("Date: {:?}", datetime.naive_utc());

    match CpuInfo::new() {
        Ok(cpu_info) => {
            println!(
                "CPU: {} * {}",
                cpu_info.cpus.len(),
                cpu_info
                    .fields
                    .get("model name")
                    .map(String::as_str)
                    .unwrap_or("unknown")
            );
            println!(
                "CPU Cache: {}",
                cpu_info
                    .fields
                    .get("cache size")
                    .map(String::as_str)
                    .unwrap_or("unknown")
            );
        }
        Err(e) => println!("CPU: unknown ({})", e),
    }
}

fn print_arguments(options: &ListOptions) {
    println!("Keys: {} bytes each", KEY_SIZE);
    println!("Values: {} bytes each", VALUE_SIZE);
    println!("Entries: {}", NUM_KVS);
    println!("RawSize: {} MB (estimated)", RAW_SIZE);
    println!(
        "Block: target fill {}, max fill {}",
        options.target_fill, options.max_fill
    );
}

struct BenchMark {
    _temp_dir: TempDir,
    options: ListOptions,
    list: List,
}

impl BenchMark {
    fn new(options: ListOptions) -> BenchMark {
        let temp_dir = tempfile::tempdir().unwrap();
        let list = List::open(temp_dir.path().join("bench.list"), options.clone()).unwrap();
        BenchMark {
            _temp_dir: temp_dir,
            options,
            list,
        }
    }

    fn reopen_list(&mut self) {
        let temp_dir = tempfile::tempdir().unwrap();
        self.list = List::open(temp_dir.path().join("bench.list"), self.options.clone()).unwrap();
        self._temp_dir = temp_dir;
    }

    fn random_value(random: &mut impl Rng) -> Value {
        let mut value = [0u8; VALUE_SIZE];
        random.fill(&mut value[..]);
        value
    }

    fn fill_seq(&mut self) {
        self.reopen_list();
        let mut random = rand::thread_rng();
        let start = std::time::Instant::now();
        for i in 0..NUM_KVS {
            self.list.insert(i, Self::random_value(&mut random)).unwrap();
        }
        self.list.flush().unwrap();
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "fill_seq: {:?} MB/s | file size: {} | blocks: {}",
            RAW_SIZE / elapsed,
            self.list.file_len(),
            self.list.block_count().unwrap()
        );
    }

    fn fill_random(&mut self) {
        self.reopen_list();
        let mut random = rand::thread_rng();
        let keys: Vec<i64> = rand::thread_rng()
            .sample_iter(Uniform::new(0, NUM_KVS))
            .take(NUM_KVS as usize)
            .collect();
        let start = std::time::Instant::now();
        let mut inserted = 0;
        for key in keys {
            if self.list.insert(key, Self::random_value(&mut random)).unwrap() {
                inserted += 1;
            }
        }
        self.list.flush().unwrap();
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "fill_random: {:?} MB/s ({} of {} inserted) | file size: {}",
            RAW_SIZE / elapsed,
            inserted,
            NUM_KVS,
            self.list.file_len()
        );
    }

    fn read_seq(&mut self) {
        let start = std::time::Instant::now();
        let mut found = 0;
        for entry in self.list.iter() {
            entry.unwrap();
            found += 1;
        }
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "read_seq: {:?} entries per second ({} entries)",
            found as f64 / elapsed,
            found
        );
    }

    fn read_random(&mut self) {
        let mut random = rand::thread_rng().sample_iter(Uniform::new(0, NUM_KVS));
        let mut not_found = 0;
        let start = std::time::Instant::now();
        for _ in 0..NUM_KVS {
            let key = random.next().unwrap();
            if self.list.get(&key).unwrap().is_none() {
                not_found += 1;
            }
        }
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "read_random: {:?} reads per second ({} of {} found)",
            NUM_KVS as f64 / elapsed,
            NUM_KVS - not_found,
            NUM_KVS
        );
    }

    fn erase_and_refill(&mut self) {
        let high_water = self.list.file_len();
        let start = std::time::Instant::now();
        for i in 0..NUM_KVS {
            self.list.erase(&i).unwrap();
        }
        let mut random = rand::thread_rng();
        for i in 0..NUM_KVS {
            self.list.insert(i, Self::random_value(&mut random)).unwrap();
        }
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "erase_and_refill: {:?} ops per second | file size: {} -> {}",
            (2 * NUM_KVS) as f64 / elapsed,
            high_water,
            self.list.file_len()
        );
    }
}

fn main() {
    let options = ListOptions::default();
    print_environment();
    print_arguments(&options);

    println!("-------------------------------------------------");
    let mut benchmark = BenchMark::new(options);
    benchmark.fill_seq();
    benchmark.read_seq();
    benchmark.read_random();
    benchmark.erase_and_refill();
    benchmark.fill_random();
    benchmark.read_random();
}
