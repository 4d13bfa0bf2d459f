//! A short guideline users can download to try the extractor.

pub const SAMPLE_FILE_NAME: &str = "contoh_panduan.txt";

pub const SAMPLE_GUIDELINE: &str = "PANDUAN FORMAT DOKUMEN

1. MARGIN
   - Atas: 4 cm
   - Bawah: 3 cm
   - Kiri: 4 cm
   - Kanan: 3 cm

2. FONT
   - Jenis: Times New Roman
   - Ukuran: 12 pt untuk isi
   - Ukuran: 14 pt untuk judul bab

3. SPASI
   - Antar baris: 1,5 (satu setengah)
   - Antar paragraf: 6 pt setelah paragraf

4. STRUKTUR DOKUMEN
   - Halaman Judul
   - Daftar Isi
   - BAB I PENDAHULUAN
   - BAB II TINJAUAN PUSTAKA
   - BAB III METODOLOGI
   - BAB IV HASIL DAN PEMBAHASAN
   - BAB V KESIMPULAN
   - Daftar Pustaka
";
